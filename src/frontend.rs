use crate::browser::{self, BrowserScheduler, CanvasSurface, Listener};
use crate::config::EffectsConfig;
use crate::error::EffectError;
use crate::feedback::{run_mock_submission, schedule_ripple_removal, RippleSet, SubmitPhase};
use crate::navigation::{self, link_targets_section, MobileMenu, NavSnapshot, ScrollThresholds};
use crate::particles::ParticleField;
use crate::pointer::{glow_position, ripple_offset, Point};
use crate::reveal::{
    animate_counter, parse_percentage, percent_label, RevealGate, SkillCounter, REVEAL_BASE_CLASS,
    SKILLS_SECTION_ID,
};
use crate::scheduler::{FrameLoop, Scheduler};
use crate::slider::SliderController;
use crate::telemetry::Logger;
use crate::typewriter::{Typewriter, TypewriterState};
use serde_json::json;
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::{closure::Closure, JsCast, JsValue};
use web_sys::{
    window, CanvasRenderingContext2d, Element, HtmlCanvasElement, HtmlFormElement,
    IntersectionObserver, IntersectionObserverEntry, IntersectionObserverInit,
};
use yew::prelude::*;

const CONFIG_ELEMENT_ID: &str = "effects-config";

const NAV_ITEMS: [(&str, &str); 5] = [
    ("#home", "Home"),
    ("#about", "About"),
    ("#skills", "Skills"),
    ("#projects", "Projects"),
    ("#contact", "Contact"),
];

const SKILLS: [(&str, &str); 6] = [
    ("Python", "92"),
    ("Machine Learning", "88"),
    ("Data Analysis", "85"),
    ("SQL", "80"),
    ("Rust", "72"),
    ("JavaScript", "75"),
];

struct Project {
    title: &'static str,
    description: &'static str,
    tags: &'static [&'static str],
}

const PROJECTS: [Project; 3] = [
    Project {
        title: "Demand Forecasting Pipeline",
        description: "Gradient-boosted forecasts over retail sales with automated feature backfills.",
        tags: &["Python", "LightGBM", "Airflow"],
    },
    Project {
        title: "Document Search Assistant",
        description: "Semantic retrieval over internal docs with an embedding index and reranker.",
        tags: &["PyTorch", "FAISS", "FastAPI"],
    },
    Project {
        title: "Realtime Metrics Dashboard",
        description: "Streaming aggregation with live charts for operational KPIs.",
        tags: &["Rust", "Kafka", "WebSockets"],
    },
];

/// Config, clock and logger shared by every effect on the page.
#[derive(Clone)]
struct Effects {
    config: Rc<EffectsConfig>,
    scheduler: Rc<BrowserScheduler>,
    logger: Logger,
}

impl PartialEq for Effects {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.config, &other.config) && Rc::ptr_eq(&self.scheduler, &other.scheduler)
    }
}

impl Effects {
    fn load() -> Self {
        let raw = browser::document()
            .ok()
            .and_then(|document| document.get_element_by_id(CONFIG_ELEMENT_ID))
            .and_then(|element| element.text_content())
            .unwrap_or_default();

        let (config, rejected, error) = match EffectsConfig::from_json(&raw) {
            Ok(loaded) => (loaded.config, loaded.rejected, None),
            Err(error) => (EffectsConfig::default(), Vec::new(), Some(error)),
        };
        let logger = config.logger();

        if let Some(error) = error {
            logger.warn("config_fallback", json!({ "error": error.to_string() }));
        }
        if !rejected.is_empty() {
            logger.warn("config_fallback", json!({ "rejected": rejected }));
        }

        Self {
            config: Rc::new(config),
            scheduler: Rc::new(BrowserScheduler::new(logger)),
            logger,
        }
    }

    fn scheduler(&self) -> Rc<dyn Scheduler> {
        self.scheduler.clone()
    }

    fn report(&self, effect: &str, error: &EffectError) {
        self.logger.effect_error(effect, error);
    }
}

#[hook]
fn use_effects() -> Effects {
    use_context::<Effects>().expect("Effects context is provided by App")
}

#[function_component(PageLoader)]
fn page_loader() -> Html {
    let effects = use_effects();
    let loaded = use_state_eq(|| false);

    {
        let loaded = loaded.clone();
        use_effect_with((), move |_| {
            let finish = move || {
                loaded.set(true);
                if let Some(body) = browser::document().ok().and_then(|document| document.body()) {
                    let _ = body.style().set_property("overflow", "auto");
                }
            };

            let already_complete = browser::document()
                .map(|document| document.ready_state() == "complete")
                .unwrap_or(false);

            let listener = if already_complete {
                finish();
                None
            } else {
                let mut finish = Some(finish);
                let subscribed = window()
                    .ok_or(EffectError::MissingElement("window"))
                    .and_then(|win| {
                        Listener::new(&win, "load", move |_| {
                            if let Some(finish) = finish.take() {
                                finish();
                            }
                        })
                    });
                match subscribed {
                    Ok(listener) => Some(listener),
                    Err(error) => {
                        effects.report("page_loader", &error);
                        None
                    }
                }
            };

            move || drop(listener)
        });
    }

    html! {
        <div class={classes!("page-loader", loaded.then_some("hide"))}>
            <div class="loader-spinner"></div>
        </div>
    }
}

#[function_component(CursorGlow)]
fn cursor_glow() -> Html {
    let glow = use_node_ref();
    let effects = use_effects();

    {
        let glow = glow.clone();
        use_effect_with((), move |_| {
            let subscribed = browser::document().and_then(|document| {
                Listener::new(&document, "mousemove", move |event| {
                    let Some(event) = event.dyn_ref::<MouseEvent>() else {
                        return;
                    };
                    if let Some(element) = glow.cast::<Element>() {
                        let position = glow_position(event.client_x(), event.client_y());
                        let _ = element.set_attribute("style", &position.style());
                    }
                })
            });
            let listener = subscribed
                .map_err(|error| effects.report("cursor_glow", &error))
                .ok();

            move || drop(listener)
        });
    }

    html! { <div class="cursor-glow" ref={glow}></div> }
}

#[function_component(Navigation)]
fn navigation_bar() -> Html {
    let effects = use_effects();
    let snapshot = use_state_eq(NavSnapshot::default);
    let menu = use_state_eq(MobileMenu::default);

    {
        let snapshot = snapshot.clone();
        let thresholds = ScrollThresholds::from(effects.config.as_ref());
        use_effect_with((), move |_| {
            let report = effects.clone();
            let refresh = move || match browser::section_bounds() {
                Ok(sections) => {
                    snapshot.set(navigation::evaluate(browser::scroll_y(), &sections, thresholds));
                }
                Err(error) => effects.report("navigation", &error),
            };
            refresh();

            let listener = window()
                .ok_or(EffectError::MissingElement("window"))
                .and_then(|win| Listener::new(&win, "scroll", move |_| refresh()))
                .map_err(|error| report.report("navigation", &error))
                .ok();

            move || drop(listener)
        });
    }

    let on_toggle = {
        let menu = menu.clone();
        Callback::from(move |_: MouseEvent| menu.set((*menu).toggled()))
    };

    let on_link = {
        let menu = menu.clone();
        Callback::from(move |_: MouseEvent| menu.set((*menu).closed()))
    };

    let on_scroll_top = Callback::from(|event: MouseEvent| {
        event.prevent_default();
        if let Some(win) = window() {
            win.scroll_to_with_x_and_y(0.0, 0.0);
        }
    });

    let is_active = |href: &str| {
        snapshot
            .active
            .as_deref()
            .is_some_and(|section| link_targets_section(href, section))
    };

    html! {
        <>
            <header id="header" class={classes!("header", snapshot.header_scrolled.then_some("scroll-header"))}>
                <nav class="nav">
                    <a class="nav-logo" href="#home">{"Portfolio"}</a>
                    <ul class={classes!("nav-links", menu.panel_class())}>
                        { for NAV_ITEMS.iter().map(|(href, label)| html! {
                            <li>
                                <a
                                    class={classes!("nav-link", is_active(*href).then_some("active"))}
                                    href={*href}
                                    onclick={on_link.clone()}
                                >
                                    {*label}
                                </a>
                            </li>
                        }) }
                    </ul>
                    <button
                        class={classes!("hamburger", menu.toggle_class())}
                        type="button"
                        aria-label="Toggle navigation"
                        aria-expanded={menu.is_open().to_string()}
                        onclick={on_toggle}
                    >
                        <span class="bar"></span>
                        <span class="bar"></span>
                        <span class="bar"></span>
                    </button>
                </nav>
            </header>
            <a
                id="scrollTopBtn"
                class={classes!("scroll-top", snapshot.show_scroll_top.then_some("show"))}
                href="#home"
                aria-label="Scroll to top"
                onclick={on_scroll_top}
            >
                {"↑"}
            </a>
        </>
    }
}

#[function_component(TypingText)]
fn typing_text() -> Html {
    let effects = use_effects();
    let text = use_state(String::new);

    {
        let text = text.clone();
        use_effect_with((), move |_| {
            let config = &effects.config;
            let typewriter = match TypewriterState::new(
                config.typewriter_words.clone(),
                config.typewriter_wait_ms,
                config.type_delay_ms,
            ) {
                Ok(state) => Some(Typewriter::start(effects.scheduler(), state, move |current| {
                    text.set(current.to_string())
                })),
                Err(error) => {
                    effects.report("typewriter", &error);
                    None
                }
            };

            move || {
                if let Some(typewriter) = typewriter {
                    typewriter.stop();
                }
            }
        });
    }

    html! { <span class="typing-text">{(*text).clone()}</span> }
}

#[derive(Properties, PartialEq)]
struct RevealSectionProps {
    id: AttrValue,
    #[prop_or_default]
    class: Classes,
    #[prop_or_default]
    on_reveal: Callback<()>,
    #[prop_or_default]
    children: Html,
}

#[function_component(RevealSection)]
fn reveal_section(props: &RevealSectionProps) -> Html {
    let effects = use_effects();
    let node = use_node_ref();
    let gate = use_state_eq(|| RevealGate::new(effects.config.reveal_threshold));

    {
        let node = node.clone();
        let gate = gate.clone();
        let on_reveal = props.on_reveal.clone();
        let id = props.id.clone();
        let threshold = effects.config.reveal_threshold;
        let report = effects.clone();
        use_effect_with((), move |_| {
            let mut latch = *gate;
            let callback = Closure::<dyn FnMut(js_sys::Array, IntersectionObserver)>::new(
                move |entries: js_sys::Array, observer: IntersectionObserver| {
                    for entry in entries.iter() {
                        let Ok(entry) = entry.dyn_into::<IntersectionObserverEntry>() else {
                            continue;
                        };
                        if latch.observe(entry.is_intersecting(), entry.intersection_ratio()) {
                            observer.unobserve(&entry.target());
                            gate.set(latch);
                            effects.logger.debug("section_revealed", json!({ "id": id.as_str() }));
                            on_reveal.emit(());
                        }
                    }
                },
            );

            let options = IntersectionObserverInit::new();
            options.set_threshold(&JsValue::from_f64(threshold));
            let observer = IntersectionObserver::new_with_options(
                callback.as_ref().unchecked_ref(),
                &options,
            )
            .map_err(browser::dom_error)
            .map_err(|error| report.report("reveal", &error))
            .ok();

            if let (Some(observer), Some(element)) = (observer.as_ref(), node.cast::<Element>()) {
                observer.observe(&element);
            }

            move || {
                if let Some(observer) = observer {
                    observer.disconnect();
                }
                drop(callback);
            }
        });
    }

    html! {
        <section
            id={props.id.clone()}
            ref={node}
            class={classes!("reveal-on-scroll", REVEAL_BASE_CLASS, gate.class(), props.class.clone())}
        >
            { props.children.clone() }
        </section>
    }
}

#[derive(Properties, PartialEq)]
struct SkillBarProps {
    name: AttrValue,
    percentage: AttrValue,
    animate: bool,
}

#[function_component(SkillBar)]
fn skill_bar(props: &SkillBarProps) -> Html {
    let effects = use_effects();
    let fill = use_state_eq(|| percent_label(0));
    let label = use_state_eq(|| percent_label(0));

    {
        let fill = fill.clone();
        let label = label.clone();
        let percentage = props.percentage.clone();
        use_effect_with(props.animate, move |animate| {
            if *animate {
                match parse_percentage(&percentage) {
                    Ok(target) => {
                        fill.set(percent_label(target));
                        let counter = SkillCounter::new(
                            target,
                            f64::from(effects.config.skill_counter_duration_ms),
                        );
                        animate_counter(effects.scheduler(), counter, move |value| {
                            label.set(percent_label(value))
                        });
                    }
                    Err(error) => effects.report("skill_bar", &error),
                }
            }
            || ()
        });
    }

    html! {
        <div class="skill-bar-item" data-percentage={props.percentage.clone()}>
            <div class="skill-info">
                <span class="skill-name">{props.name.clone()}</span>
                <span class="skill-percentage">{(*label).clone()}</span>
            </div>
            <div class="skill-progress">
                <div class="skill-progress-fill" style={format!("width: {};", *fill)}></div>
            </div>
        </div>
    }
}

#[function_component(SkillsSection)]
fn skills_section() -> Html {
    let animate = use_state_eq(|| false);

    let on_reveal = {
        let animate = animate.clone();
        Callback::from(move |()| animate.set(true))
    };

    html! {
        <RevealSection id={SKILLS_SECTION_ID} class="skills" on_reveal={on_reveal}>
            <h2 class="section-title">{"Skills"}</h2>
            <div class="skill-bars">
                { for SKILLS.iter().map(|(name, percentage)| html! {
                    <SkillBar key={*name} name={*name} percentage={*percentage} animate={*animate} />
                }) }
            </div>
        </RevealSection>
    }
}

#[function_component(ProjectSlider)]
fn project_slider() -> Html {
    let effects = use_effects();
    let index = use_state_eq(|| 0usize);
    let controller = use_mut_ref(|| None::<SliderController>);

    {
        let index = index.clone();
        let controller = controller.clone();
        let effects = effects.clone();
        use_effect_with((), move |_| {
            let logger = effects.logger;
            let started = SliderController::start(
                effects.scheduler(),
                PROJECTS.len(),
                effects.config.slider_autoplay_ms,
                move |current| {
                    index.set(current);
                    logger.debug("slide_changed", json!({ "index": current }));
                },
            );
            match started {
                Ok(slider) => *controller.borrow_mut() = Some(slider),
                Err(error) => effects.report("project_slider", &error),
            }

            move || {
                if let Some(slider) = controller.borrow_mut().take() {
                    slider.stop();
                }
            }
        });
    }

    let with_slider = |action: fn(&SliderController)| {
        let controller = controller.clone();
        Callback::from(move |_: MouseEvent| {
            if let Some(slider) = controller.borrow().as_ref() {
                action(slider);
            }
        })
    };

    let on_next = with_slider(|slider| {
        slider.next();
    });
    let on_prev = with_slider(|slider| {
        slider.prev();
    });
    let on_enter = with_slider(SliderController::pause);
    let on_leave = with_slider(SliderController::resume);

    let dot = |position: usize| {
        let controller = controller.clone();
        let effects = effects.clone();
        Callback::from(move |_: MouseEvent| {
            if let Some(slider) = controller.borrow().as_ref() {
                if let Err(error) = slider.go_to(position) {
                    effects.report("project_slider", &error);
                }
            }
        })
    };

    html! {
        <div class="project-slider-container" onmouseenter={on_enter} onmouseleave={on_leave}>
            <div class="project-slider">
                { for PROJECTS.iter().enumerate().map(|(position, project)| html! {
                    <article
                        key={project.title}
                        class={classes!("project-slide", (position == *index).then_some("active"))}
                    >
                        <h3>{project.title}</h3>
                        <p>{project.description}</p>
                        <ul class="project-tags">
                            { for project.tags.iter().map(|tag| html! { <li>{*tag}</li> }) }
                        </ul>
                    </article>
                }) }
            </div>
            <button class="slider-btn prev-btn" type="button" aria-label="Previous project" onclick={on_prev}>{"‹"}</button>
            <button class="slider-btn next-btn" type="button" aria-label="Next project" onclick={on_next}>{"›"}</button>
            <div class="slider-dots">
                { for (0..PROJECTS.len()).map(|position| html! {
                    <div
                        key={position}
                        class={classes!("dot", (position == *index).then_some("active"))}
                        onclick={dot(position)}
                    ></div>
                }) }
            </div>
        </div>
    }
}

enum RippleAction {
    Add(Point),
    Expire,
}

impl Reducible for RippleSet {
    type Action = RippleAction;

    fn reduce(self: Rc<Self>, action: Self::Action) -> Rc<Self> {
        let mut next = (*self).clone();
        match action {
            RippleAction::Add(at) => {
                next.add(at);
            }
            RippleAction::Expire => {
                next.expire_oldest();
            }
        }
        Rc::new(next)
    }
}

#[derive(Properties, PartialEq)]
struct RippleButtonProps {
    label: AttrValue,
    #[prop_or_default]
    submit: bool,
    #[prop_or(SubmitPhase::Idle)]
    phase: SubmitPhase,
}

#[function_component(RippleButton)]
fn ripple_button(props: &RippleButtonProps) -> Html {
    let effects = use_effects();
    let ripples = use_reducer(RippleSet::default);

    let onclick = {
        let dispatcher = ripples.dispatcher();
        Callback::from(move |event: MouseEvent| {
            let Some(button) = event
                .current_target()
                .and_then(|target| target.dyn_into::<Element>().ok())
            else {
                return;
            };

            let rect = button.get_bounding_client_rect();
            let client = Point::new(f64::from(event.client_x()), f64::from(event.client_y()));
            dispatcher.dispatch(RippleAction::Add(ripple_offset(client, rect.left(), rect.top())));

            let expire = dispatcher.clone();
            schedule_ripple_removal(
                effects.scheduler.as_ref(),
                effects.config.ripple_lifetime_ms,
                move || expire.dispatch(RippleAction::Expire),
            );
        })
    };

    let style = props
        .phase
        .background()
        .map(|color| format!("background-color: {color};"))
        .unwrap_or_default();

    html! {
        <button
            class="btn ripple-btn"
            type={if props.submit { "submit" } else { "button" }}
            style={style}
            onclick={onclick}
        >
            { props.phase.label(&props.label).to_string() }
            { for ripples.iter().map(|ripple| html! {
                <span key={ripple.id} class="ripple" style={ripple.at.style()}></span>
            }) }
        </button>
    }
}

#[function_component(ContactSection)]
fn contact_section() -> Html {
    let effects = use_effects();
    let form = use_node_ref();
    let phase = use_state_eq(|| SubmitPhase::Idle);

    let onsubmit = {
        let form = form.clone();
        let phase = phase.clone();
        Callback::from(move |event: SubmitEvent| {
            event.prevent_default();

            let form = form.clone();
            let phase = phase.clone();
            let logger = effects.logger;
            run_mock_submission(
                effects.scheduler(),
                effects.config.submit_sending_ms,
                effects.config.submit_sent_ms,
                move |next| {
                    phase.set(next);
                    logger.info("mock_submission", json!({ "phase": next.as_str() }));
                    if next == SubmitPhase::Idle {
                        if let Some(form) = form.cast::<HtmlFormElement>() {
                            form.reset();
                        }
                    }
                },
            );
        })
    };

    html! {
        <RevealSection id="contact" class="contact">
            <h2 class="section-title">{"Get in Touch"}</h2>
            <form id="contactForm" class="contact-form" ref={form} onsubmit={onsubmit}>
                <input type="text" name="name" placeholder="Your Name" />
                <input type="email" name="email" placeholder="Your Email" />
                <textarea name="message" rows="5" placeholder="Your Message"></textarea>
                <RippleButton label="Send Message" submit=true phase={*phase} />
            </form>
        </RevealSection>
    }
}

fn mount_particles(
    effects: &Effects,
    canvas: HtmlCanvasElement,
) -> Result<(FrameLoop, Listener), EffectError> {
    let context = canvas
        .get_context("2d")
        .map_err(browser::dom_error)?
        .ok_or(EffectError::MissingElement("2d canvas context"))?
        .dyn_into::<CanvasRenderingContext2d>()
        .map_err(|value| browser::dom_error(value.into()))?;

    let area = effects.config.particle_area_per_particle;
    let mut random = js_sys::Math::random;
    let (width, height) = browser::viewport_size();
    canvas.set_width(width as u32);
    canvas.set_height(height as u32);
    let field = Rc::new(RefCell::new(ParticleField::generate(width, height, area, &mut random)));
    effects.logger.debug(
        "particles_regenerated",
        json!({ "width": width, "height": height, "count": field.borrow().len() }),
    );

    let frames = {
        let field = field.clone();
        FrameLoop::start(effects.scheduler(), move |_| {
            field.borrow_mut().frame(&mut CanvasSurface::new(&context));
            true
        })
    };

    let logger = effects.logger;
    let win = window().ok_or(EffectError::MissingElement("window"))?;
    let resize = Listener::new(&win, "resize", move |_| {
        let (width, height) = browser::viewport_size();
        canvas.set_width(width as u32);
        canvas.set_height(height as u32);
        field.borrow_mut().resize(width, height, &mut random);
        logger.debug(
            "particles_regenerated",
            json!({ "width": width, "height": height, "count": field.borrow().len() }),
        );
    })?;

    Ok((frames, resize))
}

#[function_component(ParticleCanvas)]
fn particle_canvas() -> Html {
    let effects = use_effects();
    let canvas = use_node_ref();

    {
        let canvas = canvas.clone();
        use_effect_with((), move |_| {
            let mounted = canvas
                .cast::<HtmlCanvasElement>()
                .ok_or(EffectError::MissingElement("#particles-canvas"))
                .and_then(|canvas| mount_particles(&effects, canvas));
            let mounted = mounted
                .map_err(|error| effects.report("particles", &error))
                .ok();

            move || drop(mounted)
        });
    }

    html! { <canvas id="particles-canvas" ref={canvas}></canvas> }
}

#[function_component(App)]
fn app() -> Html {
    let effects = use_memo((), |_| Effects::load());

    {
        let effects = (*effects).clone();
        use_effect_with((), move |_| {
            effects.logger.info(
                "effects_started",
                json!({
                    "words": effects.config.typewriter_words.len(),
                    "slides": PROJECTS.len(),
                    "autoplayMs": effects.config.slider_autoplay_ms,
                }),
            );
            || ()
        });
    }

    html! {
        <ContextProvider<Effects> context={(*effects).clone()}>
            <PageLoader />
            <CursorGlow />
            <ParticleCanvas />
            <Navigation />
            <main>
                <section id="home" class="hero">
                    <p class="hero-greeting">{"Hi, I'm"}</p>
                    <h1 class="hero-name">{"Alex Morgan"}</h1>
                    <p class="hero-role">
                        {"I'm a "}
                        <TypingText />
                        <span class="typing-cursor" aria-hidden="true">{"|"}</span>
                    </p>
                    <div class="hero-actions">
                        <a class="btn" href="#projects">{"View Projects"}</a>
                        <RippleButton label="Download CV" />
                    </div>
                </section>

                <RevealSection id="about" class="about">
                    <h2 class="section-title">{"About Me"}</h2>
                    <p>
                        {"I build data products end to end: from exploratory analysis and model training to the services and interfaces that put them in front of people."}
                    </p>
                </RevealSection>

                <SkillsSection />

                <RevealSection id="projects" class="projects">
                    <h2 class="section-title">{"Projects"}</h2>
                    <ProjectSlider />
                </RevealSection>

                <ContactSection />
            </main>
            <footer class="footer">
                <p>{"Built with Rust and WebAssembly."}</p>
            </footer>
        </ContextProvider<Effects>>
    }
}

pub fn run() {
    yew::Renderer::<App>::with_root(
        window()
            .and_then(|w| w.document())
            .and_then(|d| d.get_element_by_id("app"))
            .expect("missing #app mount point"),
    )
    .render();
}
