use crate::auth::{logout, use_auth};
use crate::components::icons::{LogOut, Radar};
use crate::web::route::AppRoute;
use crate::web::router::{Link, use_router};
use leptos::prelude::*;
use leptos::task::spawn_local;

/// 受保护页面的公共外框：导航栏 + 内容区
#[component]
pub fn AdminLayout(children: Children) -> impl IntoView {
    let auth = use_auth();
    let router = use_router();
    let (signing_out, set_signing_out) = signal(false);

    let on_logout = move |_| {
        set_signing_out.set(true);
        spawn_local(async move {
            // 跳转由路由服务的认证状态监听完成
            logout(&auth).await;
            set_signing_out.set(false);
        });
    };

    let api_base = auth.services().client.config().base_url.clone();
    let display_name = auth.display_name();

    view! {
        <div class="min-h-screen bg-base-200 p-4 md:p-8 font-sans">
            <div class="max-w-7xl mx-auto space-y-8">
                <div class="navbar bg-base-100 rounded-box shadow-xl">
                    <div class="flex-1 gap-2">
                        <Radar attr:class="text-primary h-6 w-6" />
                        <span class="text-xl font-bold px-2">"Mine Radar Admin"</span>
                        <span class="badge badge-neutral hidden lg:inline-flex" title="API">
                            {api_base}
                        </span>
                    </div>
                    <div class="flex-none gap-2">
                        <ul class="menu menu-horizontal px-1">
                            {AppRoute::NAV
                                .into_iter()
                                .map(|route| {
                                    // 页面切换时整个外框会重新渲染
                                    let class = if router.current_route().get_untracked() == route {
                                        "active"
                                    } else {
                                        ""
                                    };
                                    view! {
                                        <li>
                                            <Link to=route class=class>{route.label()}</Link>
                                        </li>
                                    }
                                })
                                .collect_view()}
                        </ul>
                        <span class="hidden md:inline text-sm opacity-70">{display_name}</span>
                        <button
                            on:click=on_logout
                            disabled=move || signing_out.get()
                            class="btn btn-outline btn-error gap-2"
                        >
                            <LogOut attr:class="h-4 w-4" />
                            "Logout"
                        </button>
                    </div>
                </div>

                {children()}
            </div>
        </div>
    }
}
