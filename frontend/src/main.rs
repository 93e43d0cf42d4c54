use leptos::prelude::*;
use mineradar_admin::AppInfo;
use mineradar_frontend::App;

// Use lol_alloc as the global allocator for smaller WASM size
#[cfg(target_arch = "wasm32")]
use lol_alloc::{AssumeSingleThreaded, FreeListAllocator};

#[cfg(target_arch = "wasm32")]
#[global_allocator]
static ALLOCATOR: AssumeSingleThreaded<FreeListAllocator> =
    unsafe { AssumeSingleThreaded::new(FreeListAllocator::new()) };

pub fn main() {
    console_error_panic_hook::set_once();

    let level = if AppInfo::from_build_env().is_development() {
        log::Level::Debug
    } else {
        log::Level::Info
    };
    // 重复初始化只会返回错误，忽略即可
    let _ = console_log::init_with_level(level);

    mount_to_body(App);
}
