use std::collections::HashSet;

use crate::id::UserId;

/// Identities allowed to drive the shell and invite the bot into rooms.
///
/// Built once at startup and never mutated afterwards.
#[derive(Debug, Clone, Default)]
pub struct AllowList {
    users: HashSet<UserId>,
}

impl AllowList {
    pub fn new<I, S>(users: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            users: users
                .into_iter()
                .map(|u| UserId::new(u.into().trim().to_string()))
                .filter(|u| !u.as_str().is_empty())
                .collect(),
        }
    }

    pub fn contains(&self, user: &UserId) -> bool {
        self.users.contains(user)
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}
