use crate::{
    components::{workout_form::WorkoutForm, workout_list::WorkoutList},
    map_view::LeafletMap,
    storage::BrowserStorage,
};
use gloo_console::{error, info};
use gloo_timers::callback::Timeout;
use gloo_utils::window;
use workout_lib::{
    AppController, Coordinates, WorkoutId,
    config::AppConfig,
    error::{LocationError, SubmitError},
    map::MapView,
    validation::FormInput,
};
use yew::prelude::*;

mod components;
mod geolocation;
mod map_view;
mod storage;

enum MainMsg {
    LocationResolved(Result<Coordinates, LocationError>),
    MapClicked(Coordinates),
    Submit(FormInput),
    CancelForm,
    RevealForm,
    SelectWorkout(WorkoutId),
    Reset,
}

struct Model {
    app: AppController<LeafletMap, BrowserStorage>,
    form_suppressed: bool,
    form_generation: u32,
    /// Pending form reveal. Replacing it drops, and so cancels, the old timer.
    form_reveal: Option<Timeout>,
}

fn alert(message: &str) {
    let _ = window().alert_with_message(message);
}

impl Component for Model {
    type Message = MainMsg;
    type Properties = ();

    fn create(ctx: &Context<Self>) -> Self {
        let config = AppConfig::default();

        let mut map = LeafletMap::new(&config);
        let on_click = ctx.link().callback(MainMsg::MapClicked);
        map.on_click(Box::new(move |at| on_click.emit(at)));

        let app = AppController::new(config, map, BrowserStorage::local());
        info!(format!("Restored {} workouts", app.workouts().len()));

        geolocation::request_location(ctx.link().callback(MainMsg::LocationResolved));

        Self {
            app,
            form_suppressed: false,
            form_generation: 0,
            form_reveal: None,
        }
    }

    fn update(&mut self, ctx: &Context<Self>, msg: Self::Message) -> bool {
        match msg {
            MainMsg::LocationResolved(result) => {
                if let Err(err) = self.app.location_resolved(result) {
                    error!(format!("Location unavailable: {err}"));
                    alert("Could not get your location");
                }
            }
            MainMsg::MapClicked(at) => {
                return self.app.map_clicked(at);
            }
            MainMsg::Submit(input) => match self.app.submit(&input) {
                Ok(workout) => {
                    info!(format!("New workout: {}", workout.description()));
                    self.form_generation += 1;
                    self.form_suppressed = true;

                    let link = ctx.link().clone();
                    self.form_reveal = Some(Timeout::new(self.app.config().form_reveal_delay_ms, move || {
                        link.send_message(MainMsg::RevealForm);
                    }));
                }
                Err(SubmitError::InvalidInput) => {
                    alert("Inputs have to be positive numbers!");
                    return false;
                }
                Err(err) => {
                    error!(format!("Submission ignored: {err}"));
                    return false;
                }
            },
            MainMsg::CancelForm => {
                self.app.cancel_form();
            }
            MainMsg::RevealForm => {
                self.form_reveal = None;
                self.form_suppressed = false;
            }
            MainMsg::SelectWorkout(id) => {
                return self.app.select_workout(&id).is_some();
            }
            MainMsg::Reset => {
                self.app.reset();
                if let Err(err) = window().location().reload() {
                    error!(err);
                }
            }
        }
        true
    }

    fn view(&self, ctx: &Context<Self>) -> Html {
        let link = ctx.link();

        html! {
            <div class="app">
                <div class="sidebar">
                    <WorkoutForm
                        visible={self.app.form_visible()}
                        suppressed={self.form_suppressed}
                        generation={self.form_generation}
                        on_submit={link.callback(MainMsg::Submit)}
                        on_cancel={link.callback(|()| MainMsg::CancelForm)}
                    />
                    <WorkoutList
                        workouts={self.app.workouts().to_vec()}
                        on_select={link.callback(MainMsg::SelectWorkout)}
                        on_reset={link.callback(|()| MainMsg::Reset)}
                    />
                </div>
                {self.app.map().render()}
            </div>
        }
    }
}

fn main() {
    yew::Renderer::<Model>::new().render();
}
