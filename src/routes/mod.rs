/// Router Module Index
///
/// One module per route group. Each returns an unlayered `Router<AppState>`; the
/// identity middleware and the fallback are attached by `RouterBuilder`.

/// Static and read-only pages: home, about, team, logo, user list.
pub mod pages;

/// Registration, login and logout.
pub mod accounts;

/// Post listing and creation.
pub mod posts;

pub mod contact;
pub mod search;
