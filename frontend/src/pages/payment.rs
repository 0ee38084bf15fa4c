use log::{info, warn};
use wasm_bindgen_futures::spawn_local;
use yew::prelude::*;

use crate::api::Backend;
use crate::config;
use crate::dispatcher::Browser;
use crate::effects::EffectDispatcher;
use crate::error::ApiError;

/// Creates a checkout session for `variant_id` and sends the browser to it.
pub async fn start_checkout<B: Backend + ?Sized>(
    backend: &B,
    browser: &dyn Browser,
    variant_id: &str,
) -> Result<(), ApiError> {
    let url = backend.create_checkout(variant_id).await?;
    info!("Redirecting to checkout for {}", variant_id);
    // Redirect to Stripe Checkout
    browser.redirect(&url);
    Ok(())
}

#[derive(Properties, PartialEq)]
pub struct PaymentProps {
    #[prop_or_default]
    pub checkout_variant: Option<String>,
}

#[function_component]
pub fn Payment(props: &PaymentProps) -> Html {
    let effects = use_context::<EffectDispatcher>().expect("EffectDispatcher context missing");
    let pending = use_state(|| false);
    let error = use_state(|| None::<String>);
    let variant_id = props
        .checkout_variant
        .clone()
        .unwrap_or_else(|| config::DEFAULT_CHECKOUT_VARIANT.to_string());

    let onclick = {
        let pending = pending.clone();
        let error = error.clone();
        let effects = effects.clone();
        Callback::from(move |e: MouseEvent| {
            e.prevent_default();
            if *pending {
                return;
            }
            pending.set(true);
            error.set(None);
            let pending = pending.clone();
            let error = error.clone();
            let effects = effects.clone();
            let variant_id = variant_id.clone();

            spawn_local(async move {
                let backend = effects.backend();
                let browser = effects.browser();
                if let Err(e) = start_checkout(backend.as_ref(), browser.as_ref(), &variant_id).await {
                    warn!("Checkout creation failed: {}", e);
                    error.set(Some("We couldn't start the payment. Please try again.".to_string()));
                    pending.set(false);
                }
            });
        })
    };

    html! {
        <div class="payment-container">
            <h1>{"One last step"}</h1>
            <p>{"A one-time $1 activation fee reserves your benefit specialist and unlocks text updates on every program you qualify for."}</p>
            <ul class="payment-points">
                <li>{"Priority callback from a licensed agent"}</li>
                <li>{"Reminders before enrollment deadlines"}</li>
                <li>{"Cancel any time, no recurring charge"}</li>
            </ul>
            <button class="iq-button signup-button" disabled={*pending} {onclick}>
                <b>{ if *pending { "Opening secure checkout..." } else { "Pay $1 and activate" } }</b>
            </button>
            if let Some(message) = (*error).as_ref() {
                <p class="error-message">{message}</p>
            }
        </div>
    }
}
