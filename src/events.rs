//! 会话失效信号
//!
//! API 客户端在任何 401 上发出 `SessionInvalidated`，
//! AuthService 订阅它来清空存储，路由订阅它来跳转登录页。

use std::cell::{Cell, RefCell};
use std::rc::Rc;

/// 会话失效原因
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvalidationReason {
    /// 某个接口返回 401
    Unauthorized,
    /// 服务端校验 token 失败
    VerificationFailed,
    /// 存储中只有半个会话
    PartialSession,
    /// 用户主动登出
    LoggedOut,
}

pub type ListenerId = u64;

type Listener = Rc<dyn Fn(InvalidationReason)>;

/// 单线程的事件总线，克隆后共享同一组监听器
#[derive(Clone, Default)]
pub struct SessionEvents {
    listeners: Rc<RefCell<Vec<(ListenerId, Listener)>>>,
    next_id: Rc<Cell<ListenerId>>,
}

impl SessionEvents {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe<F>(&self, listener: F) -> ListenerId
    where
        F: Fn(InvalidationReason) + 'static,
    {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        self.listeners.borrow_mut().push((id, Rc::new(listener)));
        id
    }

    pub fn unsubscribe(&self, id: ListenerId) -> bool {
        let mut listeners = self.listeners.borrow_mut();
        let before = listeners.len();
        listeners.retain(|(lid, _)| *lid != id);
        listeners.len() != before
    }

    /// 按订阅顺序通知所有监听器
    ///
    /// 先复制监听器列表再调用，监听器内部可以再订阅或退订。
    pub fn emit(&self, reason: InvalidationReason) {
        let snapshot: Vec<Listener> = self
            .listeners
            .borrow()
            .iter()
            .map(|(_, l)| l.clone())
            .collect();

        log::debug!(
            "[SessionEvents] session invalidated ({:?}), {} listener(s)",
            reason,
            snapshot.len()
        );
        for listener in snapshot {
            listener(reason);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn listeners_run_in_subscription_order() {
        let events = SessionEvents::new();
        let log = Rc::new(RefCell::new(Vec::new()));

        let l1 = log.clone();
        events.subscribe(move |r| l1.borrow_mut().push(format!("first:{:?}", r)));
        let l2 = log.clone();
        events.subscribe(move |r| l2.borrow_mut().push(format!("second:{:?}", r)));

        events.emit(InvalidationReason::Unauthorized);
        assert_eq!(
            *log.borrow(),
            vec!["first:Unauthorized".to_string(), "second:Unauthorized".to_string()]
        );
    }

    #[test]
    fn unsubscribed_listeners_are_not_called() {
        let events = SessionEvents::new();
        let hits = Rc::new(Cell::new(0));

        let h = hits.clone();
        let id = events.subscribe(move |_| h.set(h.get() + 1));
        assert!(events.unsubscribe(id));
        assert!(!events.unsubscribe(id));

        events.emit(InvalidationReason::LoggedOut);
        assert_eq!(hits.get(), 0);
    }

    #[test]
    fn listener_may_unsubscribe_itself_during_emit() {
        let events = SessionEvents::new();
        let hits = Rc::new(Cell::new(0));
        let id_slot = Rc::new(Cell::new(0));

        let (e, h, slot) = (events.clone(), hits.clone(), id_slot.clone());
        let id = events.subscribe(move |_| {
            h.set(h.get() + 1);
            e.unsubscribe(slot.get());
        });
        id_slot.set(id);

        events.emit(InvalidationReason::Unauthorized);
        events.emit(InvalidationReason::Unauthorized);
        assert_eq!(hits.get(), 1);
    }
}
