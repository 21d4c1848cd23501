use workout_lib::{Workout, WorkoutId};
use yew::prelude::*;

#[derive(Properties, PartialEq)]
pub struct WorkoutListProps {
    pub workouts: Vec<Workout>,
    pub on_select: Callback<WorkoutId>,
    pub on_reset: Callback<()>,
}

#[function_component]
pub fn WorkoutList(props: &WorkoutListProps) -> Html {
    let on_reset = props.on_reset.clone();
    let on_reset = Callback::from(move |_| on_reset.emit(()));

    html! {
        <>
            <ul class="workouts">
                { for props.workouts.iter().map(|workout| workout_item(workout, &props.on_select)) }
            </ul>
            if !props.workouts.is_empty() {
                <button class="reset-btn" onclick={on_reset}>{"Delete all"}</button>
            }
        </>
    }
}

fn workout_item(workout: &Workout, on_select: &Callback<WorkoutId>) -> Html {
    let id = workout.id().clone();
    let on_select = on_select.clone();
    let onclick = Callback::from(move |_| on_select.emit(id.clone()));

    html! {
        <li
            class={format!("workout workout--{}", workout.kind())}
            data-id={workout.id().to_string()}
            {onclick}
        >
            <h2 class="workout__title">{workout.description()}</h2>
            { for workout.list_stats().into_iter().map(|row| html! {
                <div class="workout__details">
                    <span class="workout__icon">{row.icon}</span>
                    <span class="workout__value">{row.value}</span>
                    <span class="workout__unit">{row.unit}</span>
                </div>
            }) }
        </li>
    }
}
