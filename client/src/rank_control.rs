use leptos::prelude::*;

use pinmap_shared::RankFilter;

const CONTAINER_STYLE: &str = "background: rgba(255,255,255,0.9); padding: 5px; border-radius: 4px; box-shadow: 0 1px 5px rgba(0,0,0,0.4); display: flex; gap: 5px; margin-right: 10px; margin-bottom: 10px;";

fn button_style(option: RankFilter, active: bool) -> String {
    let (background, border, color) = if active {
        ("#333", "#000", "#fff")
    } else {
        ("#fff", "#ccc", option.button_color().unwrap_or("#333"))
    };
    format!(
        "border: 1px solid {border}; background: {background}; color: {color}; padding: 2px 8px; cursor: pointer; border-radius: 3px; font-size: 12px; font-weight: bold;"
    )
}

/// One button per rank option; exactly one is active.
#[component]
pub fn RankControl(rank: RwSignal<RankFilter>) -> impl IntoView {
    view! {
        <div style=CONTAINER_STYLE>
            {RankFilter::OPTIONS.into_iter().map(move |option| {
                let is_active = move || rank.get() == option;
                view! {
                    <button
                        class="rank-btn"
                        class:active=is_active
                        data-rank=format!("{option:?}").to_ascii_lowercase()
                        style=move || button_style(option, is_active())
                        on:click=move |e| {
                            e.stop_propagation();
                            rank.set(option);
                        }
                    >
                        {option.button_label()}
                    </button>
                }
            }).collect_view()}
        </div>
    }
}
