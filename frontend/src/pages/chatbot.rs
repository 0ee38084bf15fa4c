use chrono::Utc;
use gloo_timers::future::TimeoutFuture;
use log::warn;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::spawn_local;
use web_sys::{window, HtmlAudioElement, HtmlInputElement};
use yew::prelude::*;
use yew_router::prelude::*;

use crate::effects::EffectDispatcher;
use crate::funnel::{self, Conversation, Speaker, Submission};
use crate::Route;

const TRUSTED_FORM_FIELD: &str = "xxTrustedFormCertUrl_0";
const TYPING_DELAY_MS: u32 = 600;

#[derive(Properties, PartialEq)]
pub struct ChatbotProps {
    #[prop_or_default]
    pub variant: String,
}

fn play_clip(src: &str) {
    match HtmlAudioElement::new_with_src(src) {
        Ok(audio) => {
            // Autoplay is often blocked until the user interacts; the text still shows.
            if audio.play().is_err() {
                warn!("Could not play {}", src);
            }
        }
        Err(_) => warn!("Could not load {}", src),
    }
}

/// TrustedForm injects a hidden input holding the consent certificate URL.
fn trusted_form_cert_url() -> Option<String> {
    window()
        .and_then(|w| w.document())
        .and_then(|d| d.get_element_by_id(TRUSTED_FORM_FIELD))
        .and_then(|el| el.dyn_into::<HtmlInputElement>().ok())
        .map(|input| input.value())
        .filter(|v| !v.is_empty())
}

#[function_component]
pub fn Chatbot(props: &ChatbotProps) -> Html {
    let effects = use_context::<EffectDispatcher>().expect("EffectDispatcher context missing");
    let navigator = use_navigator().unwrap();
    let variant = funnel::variant(&props.variant);

    let conversation = use_state(|| Conversation::start(variant));
    let input = use_state(String::new);
    let consent = use_state(|| false);
    let typing = use_state(|| false);
    let submitting = use_state(|| false);
    let error = use_state(|| None::<String>);

    // Play the recorded prompt whenever a new question comes up
    {
        let question = conversation.current_question();
        use_effect_with_deps(move |question| {
            if let Some(src) = question.and_then(|q| q.audio) {
                play_clip(src);
            }
            || ()
        }, question);
    }

    let on_input = {
        let input = input.clone();
        Callback::from(move |e: InputEvent| {
            let target: HtmlInputElement = e.target_unchecked_into();
            input.set(target.value());
        })
    };

    let on_send = {
        let conversation = conversation.clone();
        let input = input.clone();
        let typing = typing.clone();
        Callback::from(move |e: SubmitEvent| {
            e.prevent_default();
            if *typing || input.trim().is_empty() {
                return;
            }
            let mut next = (*conversation).clone();
            let _ = next.respond(&input);
            input.set(String::new());
            typing.set(true);

            let conversation = conversation.clone();
            let typing = typing.clone();
            spawn_local(async move {
                TimeoutFuture::new(TYPING_DELAY_MS).await;
                conversation.set(next);
                typing.set(false);
            });
        })
    };

    let on_consent = {
        let consent = consent.clone();
        Callback::from(move |e: Event| {
            let target: HtmlInputElement = e.target_unchecked_into();
            consent.set(target.checked());
        })
    };

    let on_finish = {
        let conversation = conversation.clone();
        let consent = consent.clone();
        let submitting = submitting.clone();
        let error = error.clone();
        let effects = effects.clone();
        let navigator = navigator.clone();
        Callback::from(move |_: MouseEvent| {
            if *submitting || !*consent {
                return;
            }
            submitting.set(true);
            error.set(None);

            let submission = Submission::from_conversation(
                &conversation,
                *consent,
                trusted_form_cert_url(),
                effects.session().session_id(),
                Utc::now(),
            );
            let submitting = submitting.clone();
            let error = error.clone();
            let effects = effects.clone();
            let navigator = navigator.clone();

            spawn_local(async move {
                let backend = effects.backend();
                match funnel::finish(backend.as_ref(), effects.session(), &submission).await {
                    Ok(finished) => {
                        if let Some(intent) = finished.email {
                            effects.emit(intent);
                        }
                        if navigator.push_with_query(&Route::Congrats, &finished.query).is_err() {
                            navigator.push(&Route::Congrats);
                        }
                    }
                    Err(e) => {
                        warn!("Failed to store response: {}", e);
                        error.set(Some("We couldn't save your answers. Please try again.".to_string()));
                        submitting.set(false);
                    }
                }
            });
        })
    };

    html! {
        <div class="chatbot-container">
            <h1 class="chatbot-title">{variant.title}</h1>
            <div class="chat-transcript">
                { for conversation.transcript().iter().map(|message| {
                    let class = match message.speaker {
                        Speaker::Bot => "chat-bubble bot",
                        Speaker::User => "chat-bubble user",
                    };
                    html! { <div class={class}>{&message.text}</div> }
                }) }
                if *typing {
                    <div class="chat-bubble bot typing">{"..."}</div>
                }
            </div>
            if conversation.is_complete() {
                <div class="chat-finish">
                    <label class="consent">
                        <input type="checkbox" checked={*consent} onchange={on_consent} />
                        {" By continuing I agree to be contacted by phone, SMS and email about the benefits I qualify for. Consent is not a condition of purchase."}
                    </label>
                    <button
                        class="iq-button signup-button"
                        disabled={!*consent || *submitting}
                        onclick={on_finish}
                    >
                        <b>{ if *submitting { "Checking..." } else { "See my results" } }</b>
                    </button>
                    if let Some(message) = (*error).as_ref() {
                        <p class="error-message">{message}</p>
                    }
                </div>
            } else {
                <form class="chat-input" onsubmit={on_send}>
                    <input
                        type="text"
                        value={(*input).clone()}
                        oninput={on_input}
                        placeholder="Type your answer"
                    />
                    <button type="submit" disabled={*typing}>{"Send"}</button>
                </form>
            }
        </div>
    }
}
