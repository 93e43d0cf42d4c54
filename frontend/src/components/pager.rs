use leptos::prelude::*;
use mineradar_shared::Pagination;

/// 列表底部的分页栏
#[component]
pub fn Pager(pagination: Signal<Pagination>, page: RwSignal<u32>, #[prop(into)] noun: String) -> impl IntoView {
    let summary = move || {
        let p = pagination.get();
        match p.showing_range() {
            Some((start, end)) => format!("Showing {}-{} of {} {}", start, end, p.total, noun),
            None => format!("No {}", noun),
        }
    };

    view! {
        <div class="flex items-center justify-between p-4">
            <span class="text-sm opacity-70">{summary}</span>
            <div class="join">
                <button
                    class="join-item btn btn-sm"
                    disabled=move || !pagination.get().has_prev()
                    on:click=move |_| page.update(|p| *p = p.saturating_sub(1).max(1))
                >
                    "«"
                </button>
                <button class="join-item btn btn-sm btn-disabled">
                    {move || {
                        let p = pagination.get();
                        format!("Page {} / {}", p.page, p.pages.max(1))
                    }}
                </button>
                <button
                    class="join-item btn btn-sm"
                    disabled=move || !pagination.get().has_next()
                    on:click=move |_| page.update(|p| *p += 1)
                >
                    "»"
                </button>
            </div>
        </div>
    }
}
