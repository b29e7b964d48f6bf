use std::sync::{Mutex, MutexGuard};

use tokio::sync::watch;

type Observer<T> = Box<dyn Fn(&T) + Send + Sync>;

/// An observable state cell. Listeners registered with `subscribe` run after
/// every change, in the order they were added.
pub struct Store<T> {
    tx: watch::Sender<T>,
    observers: Mutex<Vec<Observer<T>>>,
}

impl<T> Store<T>
where
    T: Clone + Send + Sync + 'static,
{
    pub fn new(value: T) -> Self {
        let (tx, _) = watch::channel(value);
        Store {
            tx,
            observers: Mutex::new(vec![]),
        }
    }

    pub fn get(&self) -> T {
        self.tx.borrow().clone()
    }

    pub fn set(&self, value: T) {
        self.tx.send_replace(value);
        self.notify();
    }

    pub fn update(&self, f: impl FnOnce(&mut T)) {
        self.tx.send_modify(f);
        self.notify();
    }

    pub fn subscribe(&self, f: impl Fn(&T) + Send + Sync + 'static) {
        self.observers().push(Box::new(f));
    }

    fn observers(&self) -> MutexGuard<'_, Vec<Observer<T>>> {
        self.observers.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn notify(&self) {
        let value = self.get();
        for observer in self.observers().iter() {
            observer(&value);
        }
    }
}

impl<T> Default for Store<T>
where
    T: Clone + Default + Send + Sync + 'static,
{
    fn default() -> Self {
        Store::new(T::default())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    #[test]
    fn test_set_and_update() {
        let store = Store::new(1);
        assert_eq!(store.get(), 1);
        store.set(5);
        store.update(|v| *v += 2);
        assert_eq!(store.get(), 7);
    }

    #[test]
    fn test_subscribers_run_in_order() {
        let store = Store::new(String::new());
        let seen = Arc::new(Mutex::new(vec![]));
        for tag in ["a", "b"] {
            let seen = seen.clone();
            store.subscribe(move |v: &String| seen.lock().unwrap().push(format!("{tag}:{v}")));
        }
        store.set("x".into());
        store.update(|v| v.push('y'));
        assert_eq!(
            *seen.lock().unwrap(),
            vec!["a:x", "b:x", "a:xy", "b:xy"]
        );
    }
}
