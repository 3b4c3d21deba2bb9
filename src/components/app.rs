use std::rc::Rc;

use gloo::events::EventListener;
use gloo::timers::callback::Timeout;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::spawn_local;
use web_sys::{Element, Event, EventTarget, MouseEvent, Window};
use yew::prelude::*;

use crate::dom::{after_two_frames, match_element, Subscription};
use crate::model::{Anchor, NavigationState, WorkId};
use crate::services;
use crate::services::history::{self, BrowserHistory};
use crate::session::Session;
use crate::state::popup::FrameStep;
use crate::state::{OpenRequest, PopupAction, PopupPhase, PopupState, Surface};
use crate::util::rgb_to_hex;

#[derive(Properties)]
pub struct AppProps {
    pub session: Rc<Session>,
}

impl PartialEq for AppProps {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.session, &other.session)
    }
}

/// The popup region. Mounted into the popup container; renders the fetched
/// fragment and keeps the rest of the page in step with [`PopupState`].
#[function_component(App)]
pub fn app(props: &AppProps) -> Html {
    let session = props.session.clone();
    let popup = use_reducer({
        let defaults = session.defaults.clone();
        move || PopupState::new(defaults.title, defaults.path)
    });

    // Wire page events once
    {
        let session = session.clone();
        let dispatcher = popup.dispatcher();
        use_effect_with((), move |_| {
            let subscriptions = subscribe_tiles(&session, dispatcher.clone());
            let popstate = {
                let dispatcher = dispatcher.clone();
                BrowserHistory::on_restore(&session.window, move |state| {
                    dispatcher.dispatch(PopupAction::Restore(state));
                })
            };
            let blink = session.scroll_blink();
            if NavigationState::from_value(&session.initial_state).is_open() {
                log::info!("popup: reopening work from the loaded history entry");
                dispatcher.dispatch(PopupAction::Restore(session.initial_state.clone()));
            }
            move || {
                drop(subscriptions);
                drop(popstate);
                drop(blink);
            }
        });
    }

    // Fetch content (and its stylesheet) for each new open
    {
        let session = session.clone();
        let dispatcher = popup.dispatcher();
        let target = match popup.phase {
            PopupPhase::Opening => popup.nav.work.clone(),
            _ => None,
        };
        use_effect_with(popup.ticket, move |&ticket| {
            if let Some(work) = target {
                spawn_local(load_work(session, work, ticket, dispatcher));
            }
            || ()
        });
    }

    // Open choreography: two frames at the anchor, then the transition
    {
        let dispatcher = popup.dispatcher();
        let phase = popup.phase;
        let popup_el: EventTarget = session.popup.clone().into();
        let transition_ms = session.config.transition_ms;
        use_effect_with((popup.ticket, popup.frame), move |&(ticket, frame)| {
            let mut frames = None;
            let mut settle = None;
            match (phase, frame) {
                (PopupPhase::Opening, FrameStep::Snap) => {
                    let dispatcher = dispatcher.clone();
                    frames = Some(after_two_frames(move || {
                        dispatcher.dispatch(PopupAction::FramesElapsed { ticket });
                    }));
                }
                (PopupPhase::Opening, FrameStep::Animate) => {
                    let on_end = {
                        let dispatcher = dispatcher.clone();
                        let own = popup_el.clone();
                        EventListener::new(&popup_el, "transitionend", move |event| {
                            if event.target().as_ref() == Some(&own) {
                                dispatcher.dispatch(PopupAction::AnimationSettled { ticket });
                            }
                        })
                    };
                    let fallback = Timeout::new(transition_ms, move || {
                        dispatcher.dispatch(PopupAction::AnimationSettled { ticket });
                    });
                    settle = Some((on_end, fallback));
                }
                _ => {}
            }
            move || {
                drop(frames);
                drop(settle);
            }
        });
    }

    // Record history entries the state asked for
    {
        let session = session.clone();
        let entry = popup.pending_push.clone();
        use_effect_with(popup.push_seq, move |_| {
            if let Some(entry) = entry {
                history::record(&session.history, session.analytics.as_ref(), &entry);
            }
            || ()
        });
    }

    // Page surface: classes, position, tint, lock, title
    {
        let session = session.clone();
        use_effect_with(Surface::project(&popup), move |surface| {
            surface.apply(&session.config, &session.document, &session.popup, &session.body);
            || ()
        });
    }

    {
        let failure = popup.failure.clone();
        use_effect_with(failure, |failure| {
            if let Some(err) = failure {
                log::error!("popup: {}", err);
            }
            || ()
        });
    }

    match popup.content.as_ref().and_then(|f| f.html.clone()) {
        Some(markup) => Html::from_html_unchecked(AttrValue::from(markup)),
        None => html! {},
    }
}

async fn load_work(
    session: Rc<Session>,
    work: WorkId,
    ticket: u64,
    dispatcher: UseReducerDispatcher<PopupState>,
) {
    let stylesheets = session.config.stylesheets.then_some(&session.stylesheets);
    match services::load_work(&session.resolver, stylesheets, &work).await {
        Ok(fragment) => dispatcher.dispatch(PopupAction::ContentResolved { ticket, fragment }),
        Err(error) => dispatcher.dispatch(PopupAction::ContentFailed { ticket, error }),
    }
}

fn subscribe_tiles(
    session: &Rc<Session>,
    dispatcher: UseReducerDispatcher<PopupState>,
) -> Vec<Subscription> {
    let config = &session.config;
    let mut subscriptions = Vec::new();

    subscriptions.push({
        let project_selector = config.project_selector.clone();
        let opened_class = config.project_opened_class.clone();
        session
            .router
            .subscribe("click", &config.project_link_selector, move |event, link| {
                event.prevent_default();
                if let Some(project) = match_element(link, &project_selector) {
                    let _ = project.class_list().toggle(&opened_class);
                }
            })
    });

    subscriptions.push({
        let session_ref = session.clone();
        let dispatcher = dispatcher.clone();
        session
            .router
            .subscribe("click", &config.work_link_selector, move |event, link| {
                event.prevent_default();
                match open_request(&session_ref, event, link) {
                    Some(req) => dispatcher.dispatch(PopupAction::Open(req)),
                    None => log::warn!("popup: work link without project/work ids"),
                }
            })
    });

    subscriptions.push({
        session
            .router
            .subscribe("click", &format!("#{}", config.popup_id), move |event, _| {
                event.prevent_default();
                dispatcher.dispatch(PopupAction::Close(click_point(event)));
            })
    });

    subscriptions
}

fn open_request(session: &Session, event: &Event, link: &Element) -> Option<OpenRequest> {
    let config = &session.config;
    let work_el = match_element(link, &config.work_selector)?;
    let project_el = match_element(&work_el, &config.project_selector)?;
    let work = work_el.get_attribute("data-work").filter(|v| !v.is_empty())?;
    let project = project_el
        .get_attribute("data-project")
        .filter(|v| !v.is_empty())?;
    Some(OpenRequest {
        work: WorkId::new(project, work),
        anchor: click_point(event),
        fill: sample_fill(&session.window, link, &config.fill_selector),
    })
}

fn click_point(event: &Event) -> Anchor {
    event
        .dyn_ref::<MouseEvent>()
        .map(|e| Anchor::new(e.client_x() as f64, e.client_y() as f64))
        .unwrap_or_default()
}

/// Computed SVG fill of the tile's swatch, as `#rrggbb`.
fn sample_fill(window: &Window, link: &Element, selector: &str) -> Option<String> {
    let swatch = link.query_selector(selector).ok().flatten()?;
    let style = window.get_computed_style(&swatch).ok().flatten()?;
    let raw = style.get_property_value("fill").ok()?;
    rgb_to_hex(&raw)
}
