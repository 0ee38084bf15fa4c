use web_sys::{window, UrlSearchParams};

use crate::api::{Backend, Offer};
use crate::error::ApiError;
use crate::phone::sanitize_phone;
use crate::session::SessionContext;

#[derive(Debug, Clone, PartialEq)]
pub struct Identity {
    pub user_id: String,
    pub phone: Option<String>,
}

/// Identity hints from the page URL.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UrlParams {
    pub user_id: Option<String>,
    pub phone: Option<String>,
}

impl UrlParams {
    /// Reads `userId` (or the older `name`) and `phone` from the current query string.
    pub fn from_location() -> Self {
        let params = window()
            .and_then(|w| w.location().search().ok())
            .and_then(|search| UrlSearchParams::new_with_str(&search).ok());
        match params {
            Some(params) => Self {
                user_id: params.get("userId").or_else(|| params.get("name")),
                phone: params.get("phone"),
            },
            None => Self::default(),
        }
    }
}

/// Picks the identity from the URL, then component props, then the session.
/// Whatever is found is written back so sibling pages see the same user.
pub fn resolve_identity(
    url: &UrlParams,
    props_user: Option<&str>,
    props_phone: Option<&str>,
    session: &SessionContext,
) -> Option<Identity> {
    let user_id = first_non_empty([url.user_id.clone(), props_user.map(str::to_string)])
        .or_else(|| session.last_user());
    let phone = first_non_empty([url.phone.clone(), props_phone.map(str::to_string)])
        .map(|p| sanitize_phone(&p))
        .filter(|p| !p.is_empty())
        .or_else(|| session.last_phone());

    if let Some(phone) = &phone {
        session.set_last_phone(phone);
    }
    let user_id = user_id?;
    session.set_last_user(&user_id);
    Some(Identity { user_id, phone })
}

fn first_non_empty<const N: usize>(candidates: [Option<String>; N]) -> Option<String> {
    candidates
        .into_iter()
        .flatten()
        .map(|v| v.trim().to_string())
        .find(|v| !v.is_empty())
}

/// Fetches the offer for a resolved identity. Without an identity no request is made.
pub async fn load_offer<B: Backend + ?Sized>(
    backend: &B,
    identity: Option<&Identity>,
) -> Option<Result<Offer, ApiError>> {
    let identity = identity?;
    Some(backend.fetch_offer(&identity.user_id).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::FakeBackend;
    use futures::executor::block_on;

    fn url(user: Option<&str>, phone: Option<&str>) -> UrlParams {
        UrlParams {
            user_id: user.map(str::to_string),
            phone: phone.map(str::to_string),
        }
    }

    #[test]
    fn url_beats_props_beats_session() {
        let session = SessionContext::in_memory();
        session.set_last_user("from-session");

        let id = resolve_identity(&url(Some("from-url"), None), Some("from-props"), None, &session).unwrap();
        assert_eq!(id.user_id, "from-url");

        let id = resolve_identity(&url(None, None), Some("from-props"), None, &session).unwrap();
        assert_eq!(id.user_id, "from-props");

        let id = resolve_identity(&url(Some("  "), None), None, None, &session).unwrap();
        // The previous call stored the props value.
        assert_eq!(id.user_id, "from-props");
    }

    #[test]
    fn resolved_values_are_cached_for_sibling_pages() {
        let session = SessionContext::in_memory();
        resolve_identity(&url(Some("u-7"), Some("(555) 123-4567")), None, None, &session).unwrap();
        assert_eq!(session.last_user().as_deref(), Some("u-7"));
        assert_eq!(session.last_phone().as_deref(), Some("+15551234567"));

        let id = resolve_identity(&UrlParams::default(), None, None, &session).unwrap();
        assert_eq!(id, Identity {
            user_id: "u-7".to_string(),
            phone: Some("+15551234567".to_string()),
        });
    }

    #[test]
    fn no_identity_means_no_offer_request() {
        let session = SessionContext::in_memory();
        let identity = resolve_identity(&UrlParams::default(), None, Some("5551234567"), &session);
        assert!(identity.is_none());
        // The phone is still remembered.
        assert_eq!(session.last_phone().as_deref(), Some("+15551234567"));

        let backend = FakeBackend::default();
        assert!(block_on(load_offer(&backend, identity.as_ref())).is_none());
    }

    #[test]
    fn offer_is_fetched_for_identity() {
        let backend = FakeBackend::default();
        backend.set_offer(Ok(Offer {
            full_name: "Ada Lovelace".to_string(),
            tags: vec!["Debt".to_string()],
        }));
        let identity = Identity { user_id: "u-1".to_string(), phone: None };
        let offer = block_on(load_offer(&backend, Some(&identity))).unwrap().unwrap();
        assert_eq!(offer.full_name, "Ada Lovelace");
    }
}
