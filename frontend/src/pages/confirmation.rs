use yew::prelude::*;
use yew_router::prelude::*;

use crate::effects::EffectDispatcher;
use crate::Route;

#[function_component]
pub fn Confirmation() -> Html {
    let effects = use_context::<EffectDispatcher>().expect("EffectDispatcher context missing");
    let phone = effects.session().last_phone();

    html! {
        <div class="confirmation-container">
            <h1>{"You're all set!"}</h1>
            <p>{"Your payment went through and your benefit specialist has been notified."}</p>
            {
                match phone {
                    Some(phone) => html! {
                        <p>{format!("We'll text {} with next steps shortly.", phone)}</p>
                    },
                    None => html! {
                        <p>{"We'll be in touch with next steps shortly."}</p>
                    },
                }
            }
            <Link<Route> to={Route::Congrats} classes="forward-link">
                {"Back to my benefits"}
            </Link<Route>>
        </div>
    }
}

#[function_component]
pub fn NotFound() -> Html {
    html! {
        <div class="confirmation-container">
            <h1>{"Page not found"}</h1>
            <Link<Route> to={Route::Home} classes="forward-link">
                {"Start over"}
            </Link<Route>>
        </div>
    }
}
