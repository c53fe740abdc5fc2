//! Bounded, newest-first notification store.
//!
//! # Invariants
//!
//! - at most `capacity` notifications are held
//! - entries are ordered by receipt, newest first, regardless of `timestamp`
//! - `unread_count` equals the number of entries with `read == false`
//! - no notification originates from the owner

use std::collections::VecDeque;

use crate::domain::foundation::{MessageId, UserId, ValidationError};

use super::{ChatMessage, Notification};

/// Default number of notifications kept.
pub const DEFAULT_CAPACITY: usize = 20;

/// Result of offering a message to the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReceiveOutcome {
    /// Stored as a new unread notification. Carries the entry pushed out of
    /// the tail, if the store was full.
    Added { evicted: Option<Notification> },
    /// Sent by the store owner; discarded.
    IgnoredOwnMessage,
    /// A notification with the same id is already held; discarded.
    IgnoredDuplicate,
}

impl ReceiveOutcome {
    pub fn is_added(&self) -> bool {
        matches!(self, ReceiveOutcome::Added { .. })
    }
}

/// In-memory notification list owned by one user session.
///
/// The store itself is not synchronized; callers that share it across
/// tasks wrap it (see `application::NotificationFeed`).
#[derive(Debug, Clone)]
pub struct NotificationStore {
    owner: UserId,
    capacity: usize,
    entries: VecDeque<Notification>,
    unread_count: usize,
}

impl NotificationStore {
    /// Creates an empty store with the default capacity.
    pub fn new(owner: UserId) -> Self {
        Self {
            owner,
            capacity: DEFAULT_CAPACITY,
            entries: VecDeque::with_capacity(DEFAULT_CAPACITY),
            unread_count: 0,
        }
    }

    /// Creates an empty store holding at most `capacity` entries.
    ///
    /// # Errors
    ///
    /// - `OutOfRange` if capacity is zero
    pub fn with_capacity(owner: UserId, capacity: usize) -> Result<Self, ValidationError> {
        if capacity == 0 {
            return Err(ValidationError::out_of_range(
                "capacity",
                1,
                i64::MAX,
                0,
            ));
        }
        Ok(Self {
            owner,
            capacity,
            entries: VecDeque::with_capacity(capacity),
            unread_count: 0,
        })
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Accessors
    // ─────────────────────────────────────────────────────────────────────────

    pub fn owner(&self) -> &UserId {
        &self.owner
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn unread_count(&self) -> usize {
        self.unread_count
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Notifications, newest first.
    pub fn iter(&self) -> impl Iterator<Item = &Notification> {
        self.entries.iter()
    }

    pub fn get(&self, id: &MessageId) -> Option<&Notification> {
        self.entries.iter().find(|n| n.id() == id)
    }

    /// Owned copy of the list, newest first.
    pub fn to_vec(&self) -> Vec<Notification> {
        self.entries.iter().cloned().collect()
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Mutations
    // ─────────────────────────────────────────────────────────────────────────

    /// Offers an inbound message.
    ///
    /// Messages from the owner are discarded. So is any message whose id is
    /// already in the list, which means the list grows by one per call only
    /// for distinct ids (`len == min(capacity, distinct ids received)`). A
    /// redelivery after the original was evicted is accepted again. Otherwise
    /// the message becomes the newest unread notification and the oldest
    /// entry is evicted once capacity is exceeded.
    pub fn receive(&mut self, message: ChatMessage) -> ReceiveOutcome {
        if message.sender.is(&self.owner) {
            return ReceiveOutcome::IgnoredOwnMessage;
        }
        if self.get(&message.id).is_some() {
            return ReceiveOutcome::IgnoredDuplicate;
        }

        self.entries.push_front(Notification::from_message(message));
        self.unread_count += 1;

        let evicted = if self.entries.len() > self.capacity {
            self.entries.pop_back()
        } else {
            None
        };
        if let Some(old) = &evicted {
            if !old.is_read() {
                self.unread_count = self.unread_count.saturating_sub(1);
            }
        }

        ReceiveOutcome::Added { evicted }
    }

    /// Marks one notification read.
    ///
    /// Returns `false` (no-op) if the id is absent or already read.
    pub fn mark_read(&mut self, id: &MessageId) -> bool {
        let changed = self
            .entries
            .iter_mut()
            .find(|n| n.id() == id)
            .map(Notification::mark_read)
            .unwrap_or(false);

        if changed {
            self.unread_count = self.unread_count.saturating_sub(1);
        }
        changed
    }

    /// Marks every notification read. Returns how many changed.
    pub fn mark_all_read(&mut self) -> usize {
        let changed = self
            .entries
            .iter_mut()
            .map(Notification::mark_read)
            .filter(|changed| *changed)
            .count();
        self.unread_count = 0;
        changed
    }

    /// Drops all notifications and rebinds the store to a new owner.
    ///
    /// Call on login, logout or account switch.
    pub fn reset(&mut self, owner: UserId) {
        self.owner = owner;
        self.entries.clear();
        self.unread_count = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::{ChannelId, Timestamp};
    use crate::domain::user::User;
    use proptest::prelude::*;

    const OWNER: &str = "candidate-1";

    fn owner() -> UserId {
        UserId::new(OWNER).unwrap()
    }

    fn message_from(id: &str, sender: &str) -> ChatMessage {
        ChatMessage::new(
            MessageId::new(id).unwrap(),
            User::new(UserId::new(sender).unwrap()),
            format!("body of {id}"),
            ChannelId::new(format!("chan-{sender}")).unwrap(),
            Timestamp::now(),
        )
    }

    fn message(id: &str) -> ChatMessage {
        message_from(id, "recruiter-1")
    }

    fn mid(id: &str) -> MessageId {
        MessageId::new(id).unwrap()
    }

    fn counted_unread(store: &NotificationStore) -> usize {
        store.iter().filter(|n| !n.is_read()).count()
    }

    #[test]
    fn receive_prepends_and_counts() {
        let mut store = NotificationStore::new(owner());

        assert!(store.receive(message("a")).is_added());
        assert!(store.receive(message("b")).is_added());

        let ids: Vec<_> = store.iter().map(|n| n.id().as_str().to_string()).collect();
        assert_eq!(ids, vec!["b", "a"]);
        assert_eq!(store.unread_count(), 2);
    }

    #[test]
    fn own_messages_are_ignored() {
        let mut store = NotificationStore::new(owner());

        let outcome = store.receive(message_from("a", OWNER));

        assert_eq!(outcome, ReceiveOutcome::IgnoredOwnMessage);
        assert!(store.is_empty());
        assert_eq!(store.unread_count(), 0);
    }

    #[test]
    fn redelivered_message_is_ignored() {
        let mut store = NotificationStore::new(owner());
        store.receive(message("a"));

        assert_eq!(store.receive(message("a")), ReceiveOutcome::IgnoredDuplicate);
        assert_eq!(store.len(), 1);
        assert_eq!(store.unread_count(), 1);
    }

    #[test]
    fn repeated_ids_do_not_grow_the_list() {
        let mut store = NotificationStore::new(owner());
        for _ in 0..5 {
            store.receive(message("a"));
        }
        store.receive(message("b"));

        assert_eq!(store.len(), 2);
    }

    #[test]
    fn redelivery_after_eviction_is_accepted_again() {
        let mut store = NotificationStore::with_capacity(owner(), 2).unwrap();
        store.receive(message("a"));
        store.receive(message("b"));
        store.receive(message("c"));

        assert!(store.receive(message("a")).is_added());
        assert_eq!(store.iter().next().map(|n| n.id().as_str()), Some("a"));
    }

    #[test]
    fn twenty_five_messages_keep_last_twenty() {
        let mut store = NotificationStore::new(owner());
        for i in 0..25 {
            store.receive(message(&format!("m{i}")));
        }

        assert_eq!(store.len(), 20);
        assert_eq!(store.unread_count(), 20);

        let ids: Vec<_> = store.iter().map(|n| n.id().as_str().to_string()).collect();
        let expected: Vec<_> = (5..25).rev().map(|i| format!("m{i}")).collect();
        assert_eq!(ids, expected);
    }

    #[test]
    fn evicting_read_entry_keeps_unread_count() {
        let mut store = NotificationStore::with_capacity(owner(), 2).unwrap();
        store.receive(message("a"));
        store.mark_read(&mid("a"));
        store.receive(message("b"));

        let outcome = store.receive(message("c"));

        match outcome {
            ReceiveOutcome::Added { evicted: Some(old) } => assert_eq!(old.id().as_str(), "a"),
            other => panic!("unexpected outcome: {other:?}"),
        }
        assert_eq!(store.unread_count(), 2);
    }

    #[test]
    fn mark_read_then_again_is_noop() {
        let mut store = NotificationStore::new(owner());
        store.receive(message("a"));
        assert_eq!(store.unread_count(), 1);

        assert!(store.mark_read(&mid("a")));
        assert_eq!(store.unread_count(), 0);

        assert!(!store.mark_read(&mid("a")));
        assert_eq!(store.unread_count(), 0);
    }

    #[test]
    fn mark_read_unknown_id_is_noop() {
        let mut store = NotificationStore::new(owner());
        store.receive(message("a"));

        assert!(!store.mark_read(&mid("zzz")));
        assert_eq!(store.unread_count(), 1);
        assert!(!store.get(&mid("a")).unwrap().is_read());
    }

    #[test]
    fn mark_all_read_reports_changed_entries() {
        let mut store = NotificationStore::new(owner());
        store.receive(message("a"));
        store.receive(message("b"));
        store.receive(message("c"));
        store.mark_read(&mid("b"));

        assert_eq!(store.mark_all_read(), 2);
        assert_eq!(store.unread_count(), 0);
        assert!(store.iter().all(Notification::is_read));
    }

    #[test]
    fn order_follows_receipt_not_timestamp() {
        let mut store = NotificationStore::new(owner());
        let mut late = message("late");
        late.created_at = Timestamp::now().plus_secs(3600);
        let mut early = message("early");
        early.created_at = Timestamp::now().plus_secs(-3600);

        store.receive(late);
        store.receive(early);

        let first = store.iter().next().unwrap();
        assert_eq!(first.id().as_str(), "early");
    }

    #[test]
    fn reset_clears_and_rebinds_owner() {
        let mut store = NotificationStore::new(owner());
        store.receive(message_from("a", "recruiter-1"));

        let new_owner = UserId::new("recruiter-1").unwrap();
        store.reset(new_owner.clone());

        assert!(store.is_empty());
        assert_eq!(store.unread_count(), 0);
        assert_eq!(store.owner(), &new_owner);
        assert_eq!(
            store.receive(message_from("b", "recruiter-1")),
            ReceiveOutcome::IgnoredOwnMessage
        );
    }

    #[test]
    fn zero_capacity_is_rejected() {
        assert!(NotificationStore::with_capacity(owner(), 0).is_err());
    }

    #[derive(Debug, Clone)]
    enum Op {
        Receive { id: usize, from_owner: bool },
        MarkRead(usize),
        MarkAllRead,
    }

    fn op_strategy() -> impl Strategy<Value = Op> {
        prop_oneof![
            4 => (0usize..60, proptest::bool::weighted(0.15))
                .prop_map(|(id, from_owner)| Op::Receive { id, from_owner }),
            2 => (0usize..60).prop_map(Op::MarkRead),
            1 => Just(Op::MarkAllRead),
        ]
    }

    proptest! {
        #![proptest_config(ProptestConfig { cases: 128, .. ProptestConfig::default() })]

        #[test]
        fn unread_count_matches_unread_entries(ops in proptest::collection::vec(op_strategy(), 0..120)) {
            let mut store = NotificationStore::new(owner());
            for op in ops {
                match op {
                    Op::Receive { id, from_owner } => {
                        let sender = if from_owner { OWNER } else { "recruiter-1" };
                        store.receive(message_from(&format!("m{id}"), sender));
                    }
                    Op::MarkRead(id) => {
                        store.mark_read(&mid(&format!("m{id}")));
                    }
                    Op::MarkAllRead => {
                        store.mark_all_read();
                    }
                }
                prop_assert_eq!(store.unread_count(), counted_unread(&store));
                prop_assert!(store.len() <= store.capacity());
            }
        }

        #[test]
        fn distinct_messages_keep_min_of_capacity_newest_first(count in 0usize..60) {
            let mut store = NotificationStore::new(owner());
            for i in 0..count {
                store.receive(message(&format!("m{i}")));
            }

            prop_assert_eq!(store.len(), count.min(DEFAULT_CAPACITY));
            let ids: Vec<String> = store.iter().map(|n| n.id().as_str().to_string()).collect();
            let expected: Vec<String> = (0..count)
                .rev()
                .take(DEFAULT_CAPACITY)
                .map(|i| format!("m{i}"))
                .collect();
            prop_assert_eq!(ids, expected);
        }

        #[test]
        fn own_messages_never_change_state(ids in proptest::collection::vec(0usize..30, 1..30)) {
            let mut store = NotificationStore::new(owner());
            store.receive(message("seed"));
            let before = store.to_vec();

            for id in ids {
                store.receive(message_from(&format!("own{id}"), OWNER));
            }

            prop_assert_eq!(store.to_vec(), before);
            prop_assert_eq!(store.unread_count(), 1);
        }

        #[test]
        fn mark_all_read_then_mark_read_stays_zero(
            received in 0usize..40,
            reads in proptest::collection::vec(0usize..40, 0..20),
        ) {
            let mut store = NotificationStore::new(owner());
            for i in 0..received {
                store.receive(message(&format!("m{i}")));
            }
            store.mark_all_read();

            for id in reads {
                let changed = store.mark_read(&mid(&format!("m{id}")));
                prop_assert!(!changed);
                prop_assert_eq!(store.unread_count(), 0);
            }
        }
    }
}
