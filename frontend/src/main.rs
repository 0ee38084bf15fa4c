use std::rc::Rc;

use yew::prelude::*;
use yew_router::prelude::*;
use log::{info, Level};

mod api;
mod benefits;
mod config;
mod dispatcher;
mod effects;
mod error;
mod funnel;
mod offer;
mod phone;
mod progress;
mod session;
mod sms;
#[cfg(test)]
mod test_support;

mod pages {
    pub mod chatbot;
    pub mod congrats;
    pub mod payment;
    pub mod confirmation;
}

use api::HttpBackend;
use dispatcher::WebBrowser;
use effects::EffectDispatcher;
use session::SessionContext;
use pages::{
    chatbot::Chatbot,
    congrats::Congrats,
    payment::Payment,
    confirmation::{Confirmation, NotFound},
};


#[derive(Clone, Routable, PartialEq)]
pub enum Route {
    #[at("/")]
    Home,
    #[at("/start/:variant")]
    Start { variant: String },
    #[at("/congrats")]
    Congrats,
    #[at("/payment")]
    Payment,
    #[at("/confirmation")]
    Confirmation,
    #[not_found]
    #[at("/404")]
    NotFound,
}


fn switch(routes: Route) -> Html {
    match routes {
        Route::Home => {
            info!("Rendering Home page");
            html! { <Chatbot /> }
        },
        Route::Start { variant } => {
            info!("Rendering funnel variant {}", variant);
            html! { <Chatbot variant={variant} /> }
        },
        Route::Congrats => {
            info!("Rendering Congrats page");
            html! { <Congrats /> }
        },
        Route::Payment => {
            info!("Rendering Payment page");
            html! { <Payment /> }
        },
        Route::Confirmation => {
            info!("Rendering Confirmation page");
            html! { <Confirmation /> }
        },
        Route::NotFound => {
            info!("Rendering NotFound page");
            html! { <NotFound /> }
        },
    }
}


#[function_component]
fn App() -> Html {
    let effects = use_state(|| {
        EffectDispatcher::new(
            Rc::new(HttpBackend::default()),
            Rc::new(WebBrowser),
            SessionContext::from_browser(),
        )
    });

    html! {
        <ContextProvider<EffectDispatcher> context={(*effects).clone()}>
            <BrowserRouter>
                <nav class="top-nav">
                    <div class="nav-content">
                        <Link<Route> to={Route::Home} classes="nav-logo">
                            {"benefits check"}
                        </Link<Route>>
                    </div>
                </nav>
                <Switch<Route> render={switch} />
            </BrowserRouter>
        </ContextProvider<EffectDispatcher>>
    }
}


fn main() {
    // Initialize console error panic hook for better error messages
    console_error_panic_hook::set_once();

    // Initialize logging
    console_log::init_with_level(Level::Info).expect("error initializing log");

    info!("Starting application");
    yew::Renderer::<App>::new().render();
}
