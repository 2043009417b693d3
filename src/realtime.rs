//! Realtime change-notification hub.
//!
//! An explicit service object standing between the hosted backend's change
//! feed and whatever wants to react to it. Constructed once at application
//! start and passed by reference; there is no module-level singleton.
//!
//! Subscriptions are keyed by table + event + optional filter and
//! reference-counted by callback set: the first subscriber for a key opens
//! the underlying channel, the last unsubscriber tears it down. Everything
//! is single-threaded and interleaved on the UI's execution context, so the
//! interior is a plain `Rc<RefCell<..>>`.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::{Rc, Weak};

use log::{debug, warn};

/// Identifies one backend change channel.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ChannelKey {
	/// Backend table name, e.g. `"projects"`.
	pub table: String,
	/// Change event, e.g. `"*"` or `"insert"`.
	pub event: String,
	/// Optional row filter expression.
	pub filter: Option<String>,
}

impl ChannelKey {
	pub fn new(table: &str, event: &str) -> Self {
		Self {
			table: table.to_string(),
			event: event.to_string(),
			filter: None,
		}
	}

	pub fn with_filter(table: &str, event: &str, filter: &str) -> Self {
		Self {
			filter: Some(filter.to_string()),
			..Self::new(table, event)
		}
	}
}

type Callback = Rc<dyn Fn()>;

struct Channel {
	callbacks: HashMap<u64, Callback>,
}

struct HubInner {
	started: bool,
	channels: HashMap<ChannelKey, Channel>,
	next_subscription: u64,
}

/// Reference-counted subscription hub with an explicit lifecycle.
#[derive(Clone)]
pub struct RealtimeHub {
	inner: Rc<RefCell<HubInner>>,
}

impl RealtimeHub {
	pub fn new() -> Self {
		Self {
			inner: Rc::new(RefCell::new(HubInner {
				started: false,
				channels: HashMap::new(),
				next_subscription: 0,
			})),
		}
	}

	/// Begin delivering notifications.
	pub fn start(&self) {
		self.inner.borrow_mut().started = true;
		debug!("realtime: hub started");
	}

	/// Stop delivering and tear down every open channel. Existing
	/// [`Subscription`] guards become inert.
	pub fn stop(&self) {
		let mut inner = self.inner.borrow_mut();
		inner.started = false;
		let torn_down = inner.channels.len();
		inner.channels.clear();
		debug!("realtime: hub stopped, {torn_down} channel(s) torn down");
	}

	pub fn is_started(&self) -> bool {
		self.inner.borrow().started
	}

	/// Register a callback for a channel key. The first subscriber for a
	/// key opens the channel. Dropping the returned guard unsubscribes;
	/// the last unsubscriber closes the channel.
	pub fn subscribe(&self, key: ChannelKey, callback: Rc<dyn Fn()>) -> Subscription {
		let mut inner = self.inner.borrow_mut();
		let id = inner.next_subscription;
		inner.next_subscription += 1;

		let channel = inner.channels.entry(key.clone()).or_insert_with(|| {
			debug!("realtime: opening channel {key:?}");
			Channel {
				callbacks: HashMap::new(),
			}
		});
		channel.callbacks.insert(id, callback);

		Subscription {
			hub: Rc::downgrade(&self.inner),
			key,
			id,
		}
	}

	/// Fan a change notification out to every callback on the key.
	///
	/// Callbacks are snapshotted first, so a callback may subscribe or
	/// unsubscribe without re-entering the hub's interior mutably.
	pub fn notify(&self, key: &ChannelKey) {
		let callbacks: Vec<Callback> = {
			let inner = self.inner.borrow();
			if !inner.started {
				warn!("realtime: notify on {key:?} while hub is not started, dropped");
				return;
			}
			match inner.channels.get(key) {
				Some(channel) => channel.callbacks.values().cloned().collect(),
				None => Vec::new(),
			}
		};
		for callback in callbacks {
			callback();
		}
	}

	/// Number of open channels.
	pub fn channel_count(&self) -> usize {
		self.inner.borrow().channels.len()
	}

	/// Number of live subscriptions on one key.
	pub fn subscriber_count(&self, key: &ChannelKey) -> usize {
		self.inner
			.borrow()
			.channels
			.get(key)
			.map(|c| c.callbacks.len())
			.unwrap_or(0)
	}
}

impl Default for RealtimeHub {
	fn default() -> Self {
		Self::new()
	}
}

/// RAII guard for one subscription; unsubscribes on drop.
pub struct Subscription {
	hub: Weak<RefCell<HubInner>>,
	key: ChannelKey,
	id: u64,
}

impl Drop for Subscription {
	fn drop(&mut self) {
		let Some(inner) = self.hub.upgrade() else {
			return;
		};
		let mut inner = inner.borrow_mut();
		if let Some(channel) = inner.channels.get_mut(&self.key) {
			channel.callbacks.remove(&self.id);
			if channel.callbacks.is_empty() {
				inner.channels.remove(&self.key);
				debug!("realtime: last unsubscriber closed channel {:?}", self.key);
			}
		}
	}
}
