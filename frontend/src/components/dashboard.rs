use crate::auth::use_auth;
use crate::components::icons::RefreshCw;
use crate::components::layout::AdminLayout;
use crate::components::notice::{Notice, NoticeToast, notice_signal};
use crate::components::reports::status_badge_class;
use leptos::prelude::*;
use leptos::task::spawn_local;
use mineradar_shared::date::{format_date, month_label};
use mineradar_shared::{CountBucket, DashboardAnalytics, format_report_type};

#[component]
pub fn DashboardPage() -> impl IntoView {
    let auth = use_auth();

    let analytics = RwSignal::new(None::<DashboardAnalytics>);
    let loading = RwSignal::new(true);
    let notice = notice_signal();

    let load = move || {
        let admin = auth.services().admin;
        loading.set(true);
        spawn_local(async move {
            match admin.dashboard_analytics().await {
                Ok(data) => analytics.set(Some(data)),
                // 401 已经触发会话失效，路由会跳转到登录页
                Err(e) if e.is_unauthorized() => {}
                Err(e) => notice.set(Some(Notice::failure("Loading analytics", &e))),
            }
            loading.set(false);
        });
    };

    // 初始加载
    load();

    let totals = move || analytics.with(|a| a.as_ref().map(|a| a.totals.clone()).unwrap_or_default());

    view! {
        <AdminLayout>
            <NoticeToast notice=notice />

            <div class="flex items-center justify-between">
                <div>
                    <h2 class="text-2xl font-bold">"Dashboard"</h2>
                    <p class="text-base-content/70 text-sm">"Platform activity at a glance."</p>
                </div>
                <button on:click=move |_| load() disabled=move || loading.get() class="btn btn-ghost btn-circle">
                    <RefreshCw attr:class=move || if loading.get() { "h-5 w-5 animate-spin" } else { "h-5 w-5" } />
                </button>
            </div>

            <div class="stats shadow w-full stats-vertical md:stats-horizontal bg-base-100">
                <div class="stat">
                    <div class="stat-title">"Users"</div>
                    <div class="stat-value text-primary">{move || totals().users}</div>
                </div>
                <div class="stat">
                    <div class="stat-title">"Reports"</div>
                    <div class="stat-value text-secondary">{move || totals().reports}</div>
                </div>
                <div class="stat">
                    <div class="stat-title">"National Directory"</div>
                    <div class="stat-value text-2xl">{move || totals().national_directory}</div>
                </div>
                <div class="stat">
                    <div class="stat-title">"Local Directory"</div>
                    <div class="stat-value text-2xl">{move || totals().local_directory}</div>
                </div>
                <div class="stat">
                    <div class="stat-title">"Hotspots"</div>
                    <div class="stat-value text-2xl text-error">{move || totals().hotspots}</div>
                </div>
            </div>

            <div class="grid gap-6 md:grid-cols-3">
                <BucketCard
                    title="Reports by status"
                    buckets=Signal::derive(move || analytics.with(|a| a.as_ref().map(|a| a.reports_by_status.clone()).unwrap_or_default()))
                    label=|b: &CountBucket| b.label().replace('_', " ")
                />
                <BucketCard
                    title="Reports by type"
                    buckets=Signal::derive(move || analytics.with(|a| a.as_ref().map(|a| a.reports_by_type.clone()).unwrap_or_default()))
                    label=|b: &CountBucket| format_report_type(b.key.as_deref())
                />
                <BucketCard
                    title="Users by role"
                    buckets=Signal::derive(move || analytics.with(|a| a.as_ref().map(|a| a.users_by_role.clone()).unwrap_or_default()))
                    label=|b: &CountBucket| b.label().replace('_', " ")
                />
            </div>

            <div class="grid gap-6 md:grid-cols-3">
                <div class="card bg-base-100 shadow-xl">
                    <div class="card-body">
                        <h3 class="card-title">"Reports per month"</h3>
                        <table class="table table-sm">
                            <tbody>
                                {move || analytics.with(|a| {
                                    a.as_ref()
                                        .map(|a| a.reports_by_month.clone())
                                        .unwrap_or_default()
                                        .into_iter()
                                        .map(|m| view! {
                                            <tr>
                                                <td>{month_label(&m.key)}</td>
                                                <td class="text-right font-mono">{m.count}</td>
                                            </tr>
                                        })
                                        .collect_view()
                                })}
                            </tbody>
                        </table>
                    </div>
                </div>

                <div class="card bg-base-100 shadow-xl md:col-span-2">
                    <div class="card-body p-0">
                        <h3 class="card-title p-6 pb-2">"Recent reports"</h3>
                        <div class="overflow-x-auto w-full">
                            <table class="table table-zebra w-full">
                                <thead>
                                    <tr>
                                        <th>"Report"</th>
                                        <th>"Type"</th>
                                        <th>"Status"</th>
                                        <th class="hidden md:table-cell">"Submitted"</th>
                                    </tr>
                                </thead>
                                <tbody>
                                    <Show when=move || analytics.with(|a| a.as_ref().is_none_or(|a| a.recent_reports.is_empty())) && !loading.get()>
                                        <tr>
                                            <td colspan="4" class="text-center py-8 text-base-content/50">
                                                "No reports yet."
                                            </td>
                                        </tr>
                                    </Show>
                                    <For
                                        each=move || analytics.with(|a| a.as_ref().map(|a| a.recent_reports.clone()).unwrap_or_default())
                                        key=|r| r.id.clone()
                                        children=move |report| {
                                            view! {
                                                <tr>
                                                    <td class="font-mono text-sm">{report.report_id.clone().unwrap_or_else(|| report.id.clone())}</td>
                                                    <td>{format_report_type(report.report_type.as_deref())}</td>
                                                    <td>
                                                        <span class=status_badge_class(report.status)>{report.status.label()}</span>
                                                    </td>
                                                    <td class="hidden md:table-cell text-sm opacity-70">
                                                        {format_date(report.submitted_at.as_deref())}
                                                    </td>
                                                </tr>
                                            }
                                        }
                                    />
                                </tbody>
                            </table>
                        </div>
                    </div>
                </div>
            </div>
        </AdminLayout>
    }
}

/// 分组计数卡片，宽度按占比显示
#[component]
fn BucketCard(
    title: &'static str,
    buckets: Signal<Vec<CountBucket>>,
    label: fn(&CountBucket) -> String,
) -> impl IntoView {
    view! {
        <div class="card bg-base-100 shadow-xl">
            <div class="card-body">
                <h3 class="card-title">{title}</h3>
                {move || {
                    let items = buckets.get();
                    let total: u64 = items.iter().map(|b| b.count).sum();
                    items
                        .into_iter()
                        .map(|b| {
                            let percent = if total == 0 { 0 } else { b.count * 100 / total };
                            view! {
                                <div class="space-y-1">
                                    <div class="flex justify-between text-sm">
                                        <span class="capitalize">{label(&b)}</span>
                                        <span class="font-mono">{b.count}</span>
                                    </div>
                                    <progress class="progress progress-primary w-full" value=percent max="100"></progress>
                                </div>
                            }
                        })
                        .collect_view()
                }}
            </div>
        </div>
    }
}
