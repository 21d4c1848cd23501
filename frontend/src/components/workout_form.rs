use web_sys::{HtmlInputElement, HtmlSelectElement};
use workout_lib::{WorkoutKind, validation::FormInput};
use yew::prelude::*;

#[derive(Properties, PartialEq)]
pub struct WorkoutFormProps {
    pub visible: bool,
    /// Forces the form out of the layout, skipping the hide transition.
    pub suppressed: bool,
    /// Bumped after every accepted submission to clear the inputs.
    pub generation: u32,
    pub on_submit: Callback<FormInput>,
    pub on_cancel: Callback<()>,
}

#[function_component]
pub fn WorkoutForm(props: &WorkoutFormProps) -> Html {
    let input = use_state(|| FormInput::new(WorkoutKind::Running));
    let distance_ref = use_node_ref();

    {
        let input = input.clone();
        use_effect_with(props.generation, move |_| {
            input.set(FormInput::new(input.kind));
        });
    }

    {
        let distance_ref = distance_ref.clone();
        use_effect_with(props.visible, move |visible| {
            if *visible {
                if let Some(element) = distance_ref.cast::<HtmlInputElement>() {
                    let _ = element.focus();
                }
            }
        });
    }

    let on_field = |apply: fn(&mut FormInput, String)| {
        let input = input.clone();
        Callback::from(move |e: InputEvent| {
            let element: HtmlInputElement = e.target_unchecked_into();
            let mut next = (*input).clone();
            apply(&mut next, element.value());
            input.set(next);
        })
    };

    let on_kind = {
        let input = input.clone();
        Callback::from(move |e: Event| {
            let element: HtmlSelectElement = e.target_unchecked_into();
            if let Some(kind) = WorkoutKind::parse(&element.value()) {
                let mut next = (*input).clone();
                next.kind = kind;
                input.set(next);
            }
        })
    };

    let onsubmit = {
        let input = input.clone();
        let on_submit = props.on_submit.clone();
        Callback::from(move |e: SubmitEvent| {
            e.prevent_default();
            on_submit.emit((*input).clone());
        })
    };

    let on_cancel = props.on_cancel.clone();
    let on_cancel = Callback::from(move |_| on_cancel.emit(()));

    let running = input.kind == WorkoutKind::Running;

    html! {
        <form
            class={classes!("form", (!props.visible).then_some("hidden"))}
            style={props.suppressed.then_some("display: none")}
            {onsubmit}
        >
            <div class="form__row">
                <label class="form__label">{"Type"}</label>
                <select class="form__input form__input--type" onchange={on_kind}>
                    <option value="running" selected={running}>{"Running"}</option>
                    <option value="cycling" selected={!running}>{"Cycling"}</option>
                </select>
            </div>
            <div class="form__row">
                <label class="form__label">{"Distance"}</label>
                <input
                    ref={distance_ref}
                    class="form__input form__input--distance"
                    placeholder="km"
                    value={input.distance.clone()}
                    oninput={on_field(|form, value| form.distance = value)}
                />
            </div>
            <div class="form__row">
                <label class="form__label">{"Duration"}</label>
                <input
                    class="form__input form__input--duration"
                    placeholder="min"
                    value={input.duration.clone()}
                    oninput={on_field(|form, value| form.duration = value)}
                />
            </div>
            <div class={classes!("form__row", (!running).then_some("form__row--hidden"))}>
                <label class="form__label">{"Cadence"}</label>
                <input
                    class="form__input form__input--cadence"
                    placeholder="step/min"
                    value={input.cadence.clone()}
                    oninput={on_field(|form, value| form.cadence = value)}
                />
            </div>
            <div class={classes!("form__row", running.then_some("form__row--hidden"))}>
                <label class="form__label">{"Elev Gain"}</label>
                <input
                    class="form__input form__input--elevation"
                    placeholder="meters"
                    value={input.elevation.clone()}
                    oninput={on_field(|form, value| form.elevation = value)}
                />
            </div>
            <button class="form__btn">{"OK"}</button>
            <button type="button" class="form__cancel" onclick={on_cancel}>{"✕"}</button>
        </form>
    }
}
