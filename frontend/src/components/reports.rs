use crate::auth::use_auth;
use crate::components::filters::ReportFilters;
use crate::components::icons::{Eye, RefreshCw, Trash2};
use crate::components::layout::AdminLayout;
use crate::components::notice::{Notice, NoticeToast, notice_signal};
use crate::components::pager::Pager;
use leptos::prelude::*;
use leptos::task::spawn_local;
use mineradar_shared::date::{DATE_PLACEHOLDER, format_date};
use mineradar_shared::{REPORT_TYPES, Report, ReportPage, ReportStatus, format_report_type};

pub fn status_badge_class(status: ReportStatus) -> &'static str {
    match status {
        ReportStatus::Pending => "badge badge-warning",
        ReportStatus::UnderInvestigation => "badge badge-info",
        ReportStatus::Resolved => "badge badge-success",
        ReportStatus::Dismissed => "badge badge-ghost",
        ReportStatus::Unknown => "badge badge-outline",
    }
}

#[component]
pub fn ReportsPage() -> impl IntoView {
    let auth = use_auth();
    let filters = ReportFilters::new();

    let data = RwSignal::new(ReportPage::default());
    let loading = RwSignal::new(true);
    let reload = RwSignal::new(0u32);
    let notice = notice_signal();
    let selected = RwSignal::new(None::<Report>);

    // 请求序号：只采用最后一次请求的结果
    let latest = StoredValue::new(0u64);

    Effect::new(move |_| {
        reload.track();
        let query = filters.to_request();
        let admin = auth.services().admin;

        latest.update_value(|n| *n += 1);
        let seq = latest.get_value();
        loading.set(true);

        spawn_local(async move {
            let result = admin.list_reports(&query).await;
            if latest.get_value() != seq {
                return;
            }
            match result {
                Ok(page) => data.set(page),
                Err(e) if e.is_unauthorized() => {}
                Err(e) => notice.set(Some(Notice::failure("Loading reports", &e))),
            }
            loading.set(false);
        });
    });

    let on_status_change = move |id: String, status: ReportStatus| {
        let admin = auth.services().admin;
        spawn_local(async move {
            match admin.update_report_status(&id, status).await {
                Ok(_) => {
                    notice.set(Some(Notice::success(format!("Report marked {}", status.label()))));
                    reload.update(|n| *n += 1);
                }
                Err(e) if e.is_unauthorized() => {}
                Err(e) => {
                    notice.set(Some(Notice::failure("Updating report", &e)));
                    // 恢复下拉框为服务端的值
                    reload.update(|n| *n += 1);
                }
            }
        });
    };

    let on_delete = move |id: String| {
        let confirmed = window()
            .confirm_with_message("Delete this report? This cannot be undone.")
            .unwrap_or(false);
        if !confirmed {
            return;
        }

        let admin = auth.services().admin;
        spawn_local(async move {
            match admin.delete_report(&id).await {
                Ok(_) => {
                    notice.set(Some(Notice::success("Report deleted")));
                    reload.update(|n| *n += 1);
                }
                Err(e) if e.is_unauthorized() => {}
                Err(e) => notice.set(Some(Notice::failure("Deleting report", &e))),
            }
        });
    };

    let on_view = move |id: String| {
        let admin = auth.services().admin;
        spawn_local(async move {
            match admin.get_report(&id).await {
                Ok(report) => selected.set(Some(report)),
                Err(e) if e.is_unauthorized() => {}
                Err(e) => notice.set(Some(Notice::failure("Loading report", &e))),
            }
        });
    };

    view! {
        <AdminLayout>
            <NoticeToast notice=notice />

            <div class="flex items-center justify-between">
                <div>
                    <h2 class="text-2xl font-bold">"Reports"</h2>
                    <p class="text-base-content/70 text-sm">"Review and triage submitted reports."</p>
                </div>
                <button
                    on:click=move |_| reload.update(|n| *n += 1)
                    disabled=move || loading.get()
                    class="btn btn-ghost btn-circle"
                >
                    <RefreshCw attr:class=move || if loading.get() { "h-5 w-5 animate-spin" } else { "h-5 w-5" } />
                </button>
            </div>

            <div class="card bg-base-100 shadow-xl">
                <div class="card-body flex-row flex-wrap gap-2 items-end">
                    <input
                        type="search"
                        placeholder="Search reports..."
                        class="input input-bordered input-sm w-full md:w-64"
                        prop:value=filters.search
                        on:change=move |ev| {
                            filters.search.set(event_target_value(&ev));
                            filters.page.set(1);
                        }
                    />
                    <select
                        class="select select-bordered select-sm"
                        prop:value=filters.status
                        on:change=move |ev| {
                            filters.status.set(event_target_value(&ev));
                            filters.page.set(1);
                        }
                    >
                        <option value="">"All statuses"</option>
                        {ReportStatus::ALL
                            .into_iter()
                            .map(|s| view! { <option value=s.as_str()>{s.label()}</option> })
                            .collect_view()}
                    </select>
                    <select
                        class="select select-bordered select-sm"
                        prop:value=filters.report_type
                        on:change=move |ev| {
                            filters.report_type.set(event_target_value(&ev));
                            filters.page.set(1);
                        }
                    >
                        <option value="">"All types"</option>
                        {REPORT_TYPES
                            .into_iter()
                            .map(|t| view! { <option value=t>{format_report_type(Some(t))}</option> })
                            .collect_view()}
                    </select>
                    <button class="btn btn-sm btn-ghost" on:click=move |_| filters.reset()>
                        "Reset"
                    </button>
                </div>
            </div>

            <div class="card bg-base-100 shadow-xl">
                <div class="card-body p-0">
                    <div class="overflow-x-auto w-full">
                        <table class="table table-zebra w-full">
                            <thead>
                                <tr>
                                    <th>"Report"</th>
                                    <th>"Type"</th>
                                    <th class="hidden lg:table-cell">"Location"</th>
                                    <th>"Status"</th>
                                    <th class="hidden md:table-cell">"Submitted"</th>
                                    <th class="text-right">"Actions"</th>
                                </tr>
                            </thead>
                            <tbody>
                                <Show when=move || data.with(|d| d.reports.is_empty()) && !loading.get()>
                                    <tr>
                                        <td colspan="6" class="text-center py-8 text-base-content/50">
                                            "No reports match the current filters."
                                        </td>
                                    </tr>
                                </Show>
                                <For
                                    each=move || data.with(|d| d.reports.clone())
                                    // 状态参与 key，更新后整行重建，下拉框跟随服务端的值
                                    key=|r| (r.id.clone(), r.status)
                                    children=move |report| {
                                        let id_status = report.id.clone();
                                        let id_view = report.id.clone();
                                        let id_delete = report.id.clone();
                                        view! {
                                            <tr>
                                                <td class="font-mono text-sm">
                                                    {report.report_id.clone().unwrap_or_else(|| report.id.clone())}
                                                </td>
                                                <td>{format_report_type(report.report_type.as_deref())}</td>
                                                <td class="hidden lg:table-cell text-sm">
                                                    {report.location.clone().unwrap_or_default()}
                                                </td>
                                                <td>
                                                    <select
                                                        class="select select-bordered select-xs"
                                                        prop:value=report.status.as_str()
                                                        on:change=move |ev| {
                                                            if let Some(status) = ReportStatus::parse(&event_target_value(&ev)) {
                                                                on_status_change(id_status.clone(), status);
                                                            }
                                                        }
                                                    >
                                                        {ReportStatus::ALL
                                                            .into_iter()
                                                            .map(|s| view! { <option value=s.as_str()>{s.label()}</option> })
                                                            .collect_view()}
                                                    </select>
                                                </td>
                                                <td class="hidden md:table-cell text-sm opacity-70">
                                                    {format_date(report.submitted_at.as_deref())}
                                                </td>
                                                <td class="text-right">
                                                    <div class="join">
                                                        <button
                                                            class="btn btn-sm btn-ghost join-item"
                                                            title="View"
                                                            on:click=move |_| on_view(id_view.clone())
                                                        >
                                                            <Eye attr:class="h-4 w-4" />
                                                        </button>
                                                        <button
                                                            class="btn btn-sm btn-ghost join-item text-error"
                                                            title="Delete"
                                                            on:click=move |_| on_delete(id_delete.clone())
                                                        >
                                                            <Trash2 attr:class="h-4 w-4" />
                                                        </button>
                                                    </div>
                                                </td>
                                            </tr>
                                        }
                                    }
                                />
                            </tbody>
                        </table>
                    </div>
                    <Pager
                        pagination=Signal::derive(move || data.with(|d| d.pagination))
                        page=filters.page
                        noun="reports"
                    />
                </div>
            </div>

            <ReportDetailDialog report=selected />
        </AdminLayout>
    }
}

/// 举报详情弹窗，`report` 为 `Some` 时打开
#[component]
fn ReportDetailDialog(report: RwSignal<Option<Report>>) -> impl IntoView {
    let dialog_ref = NodeRef::<leptos::html::Dialog>::new();

    Effect::new(move |_| {
        if let Some(dialog) = dialog_ref.get() {
            if report.with(Option::is_some) {
                if !dialog.open() {
                    let _ = dialog.show_modal();
                }
            } else if dialog.open() {
                dialog.close();
            }
        }
    });

    view! {
        <dialog class="modal" node_ref=dialog_ref on:close=move |_| report.set(None)>
            <div class="modal-box max-w-2xl">
                {move || report.get().map(|r| {
                    let gps = r
                        .gps_location
                        .map(|g| format!("{:.5}, {:.5}", g.latitude, g.longitude))
                        .unwrap_or_else(|| DATE_PLACEHOLDER.to_string());
                    let incident = match (r.incident_date.as_deref(), r.incident_time.as_deref()) {
                        (date, Some(time)) => format!("{} {}", format_date(date), time),
                        (date, None) => format_date(date),
                    };
                    view! {
                        <h3 class="font-bold text-lg flex items-center gap-2">
                            {r.report_id.clone().unwrap_or_else(|| r.id.clone())}
                            <span class=status_badge_class(r.status)>{r.status.label()}</span>
                        </h3>
                        <div class="grid grid-cols-2 gap-4 py-4 text-sm">
                            <div>
                                <div class="opacity-60">"Type"</div>
                                <div>{format_report_type(r.report_type.as_deref())}</div>
                            </div>
                            <div>
                                <div class="opacity-60">"Submitted by"</div>
                                <div>{r.submitted_by.clone().unwrap_or_else(|| "Anonymous".to_string())}</div>
                            </div>
                            <div>
                                <div class="opacity-60">"Location"</div>
                                <div>{r.location.clone().unwrap_or_default()}</div>
                            </div>
                            <div>
                                <div class="opacity-60">"GPS"</div>
                                <div class="font-mono">{gps}</div>
                            </div>
                            <div>
                                <div class="opacity-60">"Incident"</div>
                                <div>{incident}</div>
                            </div>
                            <div>
                                <div class="opacity-60">"Submitted"</div>
                                <div>{format_date(r.submitted_at.as_deref())}</div>
                            </div>
                            <div class="col-span-2">
                                <div class="opacity-60">"Additional information"</div>
                                <p class="whitespace-pre-wrap">{r.additional_info.clone().unwrap_or_default()}</p>
                            </div>
                            <div class="col-span-2 opacity-60">
                                {format!("{} attachment(s)", r.attachments.len())}
                            </div>
                        </div>
                    }
                })}
                <div class="modal-action">
                    <form method="dialog">
                        <button class="btn">"Close"</button>
                    </form>
                </div>
            </div>
            <form method="dialog" class="modal-backdrop">
                <button>"close"</button>
            </form>
        </dialog>
    }
}
