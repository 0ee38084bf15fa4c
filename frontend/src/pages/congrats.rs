use log::{info, warn};
use wasm_bindgen_futures::spawn_local;
use yew::prelude::*;
use yew_router::prelude::*;

use crate::benefits::{benefits_for_tags, Benefit};
use crate::dispatcher::dispatch_cta;
use crate::effects::{EffectDispatcher, Intent};
use crate::offer::{load_offer, resolve_identity, UrlParams};
use crate::progress::{ProgressTracker, StepStatus};
use crate::Route;

#[derive(Properties, PartialEq)]
pub struct CongratsProps {
    #[prop_or_default]
    pub user_id: Option<String>,
    #[prop_or_default]
    pub phone: Option<String>,
}

#[derive(Clone, PartialEq)]
enum PageState {
    Loading,
    Failed(String),
    Ready {
        full_name: String,
        benefits: Vec<Benefit>,
        tracker: ProgressTracker,
    },
}

#[function_component]
pub fn Congrats(props: &CongratsProps) -> Html {
    let effects = use_context::<EffectDispatcher>().expect("EffectDispatcher context missing");
    let page = use_state(|| PageState::Loading);

    {
        let page = page.clone();
        let effects = effects.clone();
        let props_user = props.user_id.clone();
        let props_phone = props.phone.clone();
        use_effect_with_deps(move |_| {
            let identity = resolve_identity(
                &UrlParams::from_location(),
                props_user.as_deref(),
                props_phone.as_deref(),
                effects.session(),
            );
            spawn_local(async move {
                let backend = effects.backend();
                let offer = match load_offer(backend.as_ref(), identity.as_ref()).await {
                    None => {
                        page.set(PageState::Failed(
                            "We couldn't find your results. Please start again from the link we sent you.".to_string(),
                        ));
                        return;
                    }
                    Some(Err(e)) => {
                        warn!("Offer lookup failed: {}", e);
                        page.set(PageState::Failed(
                            "Something went wrong loading your benefits. Please refresh the page.".to_string(),
                        ));
                        return;
                    }
                    Some(Ok(offer)) => offer,
                };
                // load_offer only succeeds with an identity
                let Some(identity) = identity else { return };

                let benefits = benefits_for_tags(&offer.tags);
                info!("{} benefit(s) for {}", benefits.len(), identity.user_id);
                let keys = benefits.iter().map(|b| b.key().to_string()).collect();
                let tracker = ProgressTracker::load(backend.as_ref(), &identity.user_id, keys).await;

                if let Some(phone) = identity.phone.clone() {
                    effects.emit(Intent::BootSms {
                        user_id: identity.user_id.clone(),
                        phone,
                        full_name: offer.full_name.clone(),
                    });
                }
                page.set(PageState::Ready {
                    full_name: offer.full_name,
                    benefits,
                    tracker,
                });
            });
            || ()
        }, ());
    }

    let on_action = {
        let page = page.clone();
        let effects = effects.clone();
        Callback::from(move |index: usize| {
            if let PageState::Ready { full_name, benefits, tracker } = &*page {
                let Some(benefit) = benefits.get(index) else { return };
                let mut tracker = tracker.clone();
                let browser = effects.browser();
                if let Some(record) = dispatch_cta(browser.as_ref(), &mut tracker, benefit, index) {
                    effects.emit(Intent::PersistProgress(record));
                    page.set(PageState::Ready {
                        full_name: full_name.clone(),
                        benefits: benefits.clone(),
                        tracker,
                    });
                }
            }
        })
    };

    match &*page {
        PageState::Loading => html! {
            <div class="congrats-container">
                <p class="loading">{"Checking your benefits..."}</p>
            </div>
        },
        PageState::Failed(message) => html! {
            <div class="congrats-container">
                <p class="error-message">{message}</p>
            </div>
        },
        PageState::Ready { full_name, benefits, tracker } => {
            let first_name = full_name.split_whitespace().next().unwrap_or("there").to_string();
            let state = tracker.state();
            html! {
                <div class="congrats-container">
                    <h1>{format!("Congratulations, {}!", first_name)}</h1>
                    if benefits.is_empty() {
                        <p>{"We didn't find a program for you right now. We'll text you if that changes."}</p>
                    } else {
                        <p>{format!("You qualify for {} benefit(s). Claim them one at a time below.", benefits.len())}</p>
                    }
                    <div class="benefit-list">
                        { for benefits.iter().enumerate().map(|(index, benefit)| {
                            let status = state.status(index);
                            let mut class = classes!("benefit-card");
                            match status {
                                StepStatus::Locked => class.push("locked"),
                                StepStatus::Completed => class.push("completed"),
                                StepStatus::Unlocked => {}
                            }
                            if index == state.active_index && status != StepStatus::Locked {
                                class.push("active");
                            }
                            let onclick = {
                                let on_action = on_action.clone();
                                Callback::from(move |_: MouseEvent| on_action.emit(index))
                            };
                            html! {
                                <div class={class}>
                                    <img src={benefit.image} alt={benefit.title} />
                                    <span class="benefit-badge">{benefit.badge}</span>
                                    <h3>{benefit.title}</h3>
                                    <p>{benefit.description}</p>
                                    if status == StepStatus::Locked {
                                        <button class="iq-button disabled" disabled=true>
                                            {"Complete the step above to unlock"}
                                        </button>
                                    } else {
                                        <button class="iq-button" {onclick}>
                                            <b>{ if status == StepStatus::Completed { "Call again" } else { benefit.call_label } }</b>
                                        </button>
                                    }
                                </div>
                            }
                        }) }
                    </div>
                    <div class="congrats-footer">
                        <Link<Route> to={Route::Payment} classes="forward-link">
                            <button class="iq-button signup-button"><b>{"Activate my benefits for $1"}</b></button>
                        </Link<Route>>
                    </div>
                </div>
            }
        }
    }
}
