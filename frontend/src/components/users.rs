use crate::auth::use_auth;
use crate::components::filters::UserFilters;
use crate::components::icons::{RefreshCw, Trash2};
use crate::components::layout::AdminLayout;
use crate::components::notice::{Notice, NoticeToast, notice_signal};
use crate::components::pager::Pager;
use leptos::prelude::*;
use leptos::task::spawn_local;
use mineradar_shared::date::format_date;
use mineradar_shared::{UserPage, UserRole, UserStatus};

fn user_status_badge_class(status: UserStatus) -> &'static str {
    match status {
        UserStatus::Active => "badge badge-success",
        UserStatus::Blocked => "badge badge-error",
        UserStatus::Unknown => "badge badge-outline",
    }
}

#[component]
pub fn UsersPage() -> impl IntoView {
    let auth = use_auth();
    let filters = UserFilters::new();

    let data = RwSignal::new(UserPage::default());
    let loading = RwSignal::new(true);
    let reload = RwSignal::new(0u32);
    let notice = notice_signal();
    let latest = StoredValue::new(0u64);

    Effect::new(move |_| {
        reload.track();
        let query = filters.to_request();
        let admin = auth.services().admin;

        latest.update_value(|n| *n += 1);
        let seq = latest.get_value();
        loading.set(true);

        spawn_local(async move {
            let result = admin.list_users(&query).await;
            if latest.get_value() != seq {
                return;
            }
            match result {
                Ok(page) => data.set(page),
                Err(e) if e.is_unauthorized() => {}
                Err(e) => notice.set(Some(Notice::failure("Loading users", &e))),
            }
            loading.set(false);
        });
    });

    let on_role_change = move |id: String, role: UserRole| {
        let admin = auth.services().admin;
        spawn_local(async move {
            match admin.update_user_role(&id, role).await {
                Ok(_) => notice.set(Some(Notice::success(format!("Role changed to {}", role.label())))),
                Err(e) if e.is_unauthorized() => return,
                Err(e) => notice.set(Some(Notice::failure("Updating role", &e))),
            }
            reload.update(|n| *n += 1);
        });
    };

    let on_toggle_status = move |id: String, current: UserStatus| {
        let target = current.toggled();
        let admin = auth.services().admin;
        spawn_local(async move {
            match admin.update_user_status(&id, target).await {
                Ok(_) => {
                    let verb = if target == UserStatus::Blocked { "blocked" } else { "unblocked" };
                    notice.set(Some(Notice::success(format!("User {}", verb))));
                    reload.update(|n| *n += 1);
                }
                Err(e) if e.is_unauthorized() => {}
                Err(e) => notice.set(Some(Notice::failure("Updating status", &e))),
            }
        });
    };

    let on_delete = move |id: String| {
        let confirmed = window()
            .confirm_with_message("Delete this user? This cannot be undone.")
            .unwrap_or(false);
        if !confirmed {
            return;
        }

        let admin = auth.services().admin;
        spawn_local(async move {
            match admin.delete_user(&id).await {
                Ok(_) => {
                    notice.set(Some(Notice::success("User deleted")));
                    reload.update(|n| *n += 1);
                }
                Err(e) if e.is_unauthorized() => {}
                Err(e) => notice.set(Some(Notice::failure("Deleting user", &e))),
            }
        });
    };

    view! {
        <AdminLayout>
            <NoticeToast notice=notice />

            <div class="flex items-center justify-between">
                <div>
                    <h2 class="text-2xl font-bold">"Users"</h2>
                    <p class="text-base-content/70 text-sm">"Manage accounts, roles and access."</p>
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
                        placeholder="Search by username or email..."
                        class="input input-bordered input-sm w-full md:w-64"
                        prop:value=filters.search
                        on:change=move |ev| {
                            filters.search.set(event_target_value(&ev));
                            filters.page.set(1);
                        }
                    />
                    <select
                        class="select select-bordered select-sm"
                        prop:value=filters.role
                        on:change=move |ev| {
                            filters.role.set(event_target_value(&ev));
                            filters.page.set(1);
                        }
                    >
                        <option value="">"All roles"</option>
                        {UserRole::ALL
                            .into_iter()
                            .map(|r| view! { <option value=r.as_str()>{r.label()}</option> })
                            .collect_view()}
                    </select>
                    <select
                        class="select select-bordered select-sm"
                        prop:value=filters.status
                        on:change=move |ev| {
                            filters.status.set(event_target_value(&ev));
                            filters.page.set(1);
                        }
                    >
                        <option value="">"All statuses"</option>
                        {UserStatus::ALL
                            .into_iter()
                            .map(|s| view! { <option value=s.as_str()>{s.label()}</option> })
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
                                    <th>"User"</th>
                                    <th>"Role"</th>
                                    <th>"Status"</th>
                                    <th class="hidden md:table-cell">"Joined"</th>
                                    <th class="text-right">"Actions"</th>
                                </tr>
                            </thead>
                            <tbody>
                                <Show when=move || data.with(|d| d.users.is_empty()) && !loading.get()>
                                    <tr>
                                        <td colspan="5" class="text-center py-8 text-base-content/50">
                                            "No users match the current filters."
                                        </td>
                                    </tr>
                                </Show>
                                <For
                                    each=move || data.with(|d| d.users.clone())
                                    key=|u| (u.id.clone(), u.role, u.status)
                                    children=move |user| {
                                        let id_role = user.id.clone();
                                        let id_status = user.id.clone();
                                        let id_delete = user.id.clone();
                                        let status = user.status;
                                        let toggle_label = if status == UserStatus::Blocked { "Unblock" } else { "Block" };
                                        view! {
                                            <tr>
                                                <td>
                                                    <div class="font-bold">{user.username.clone().unwrap_or_default()}</div>
                                                    <div class="text-sm opacity-60">{user.email.clone().unwrap_or_default()}</div>
                                                </td>
                                                <td>
                                                    <select
                                                        class="select select-bordered select-xs"
                                                        prop:value=user.role.as_str()
                                                        on:change=move |ev| {
                                                            if let Some(role) = UserRole::parse(&event_target_value(&ev)) {
                                                                on_role_change(id_role.clone(), role);
                                                            }
                                                        }
                                                    >
                                                        {UserRole::ALL
                                                            .into_iter()
                                                            .map(|r| view! { <option value=r.as_str()>{r.label()}</option> })
                                                            .collect_view()}
                                                    </select>
                                                </td>
                                                <td>
                                                    <span class=user_status_badge_class(status)>{status.label()}</span>
                                                </td>
                                                <td class="hidden md:table-cell text-sm opacity-70">
                                                    {format_date(user.created_at.as_deref())}
                                                </td>
                                                <td class="text-right">
                                                    <div class="join">
                                                        <button
                                                            class="btn btn-sm btn-ghost join-item"
                                                            on:click=move |_| on_toggle_status(id_status.clone(), status)
                                                        >
                                                            {toggle_label}
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
                        noun="users"
                    />
                </div>
            </div>
        </AdminLayout>
    }
}
