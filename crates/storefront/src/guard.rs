//! Role-based view access.
//!
//! Decides whether the current session may open a view, or where it should
//! be sent instead. Authorization is enforced again by the store API; this
//! only keeps people out of screens they cannot use.

use moto_parts_core::{Capability, Role};

/// A screen of the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum View {
    Login,
    Register,
    ForgotPassword,
    Home,
    Cart,
    Checkout,
    AdminDashboard,
    NotFound,
}

/// Outcome of a guard check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Allow,
    Redirect(View),
}

/// Check whether `role` may open `view`.
#[must_use]
pub const fn guard(role: Role, view: View) -> Access {
    match view {
        View::Login | View::Register | View::ForgotPassword => {
            if role.can(Capability::SignIn) {
                Access::Allow
            } else {
                Access::Redirect(View::AdminDashboard)
            }
        }
        View::Home | View::Cart | View::Checkout => allow_if(role.can(Capability::Shop)),
        View::AdminDashboard => allow_if(role.can(Capability::ManageStore)),
        View::NotFound => Access::Allow,
    }
}

/// Where a user lands right after logging in.
#[must_use]
pub const fn landing_view(role: Role) -> View {
    if role.can(Capability::ManageStore) {
        View::AdminDashboard
    } else {
        View::Home
    }
}

const fn allow_if(allowed: bool) -> Access {
    if allowed {
        Access::Allow
    } else {
        Access::Redirect(View::NotFound)
    }
}
