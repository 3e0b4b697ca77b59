/// Access policy evaluator
///
/// Every allow/deny decision in Taskhub is made here. The evaluator is a pure
/// function of the caller ([`Actor`]), the [`Operation`] and a [`Resource`]
/// describing the target together with the facts the decision depends on
/// (membership, assignment). Services load those facts from storage, ask the
/// evaluator, and only then touch the database.
///
/// # Rules
///
/// | Resource  | Admin / Manager | Developer                                   |
/// |-----------|-----------------|---------------------------------------------|
/// | Project   | everything      | read when member                            |
/// | Task      | everything      | create/read when member, read when assignee,|
/// |           |                 | update `status` only when assignee          |
/// | Comment   | read, create    | read, create                                |
/// | UserStory | everything      | read when member of the project             |
/// | User      | admin: all      | read; update self except role               |
///
/// Managers may read users and update themselves like any other non-admin.
///
/// # Example
///
/// ```
/// use taskhub_shared::auth::actor::Actor;
/// use taskhub_shared::auth::policy::{evaluate, Access, Decision, DenyReason, Operation, Resource};
/// use taskhub_shared::models::user::UserRole;
///
/// let developer = Actor::new(4, UserRole::Developer);
/// let decision = evaluate(&developer, Operation::Read, &Resource::Project { is_member: false });
/// assert_eq!(decision, Decision::Deny(DenyReason::NotProjectMember));
///
/// let assignee = Actor::new(2, UserRole::Developer);
/// let decision = evaluate(
///     &assignee,
///     Operation::Update,
///     &Resource::Task { is_member: false, assignee_id: Some(2) },
/// );
/// assert_eq!(decision, Decision::Allow(Access::StatusOnly));
/// ```

use std::fmt;

use super::actor::Actor;

/// What the caller wants to do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Read,
    Create,
    Update,
    Delete,
}

/// Entity kinds whose listings are scoped per actor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    /// Projects the actor is a team member of
    Project,

    /// Tasks of the actor's projects, plus tasks assigned to them
    Task,
}

/// The target of an operation plus the facts the decision depends on
///
/// For create operations the resource describes the *parent* the new row
/// will hang off (e.g. the project a task is created in).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    /// A project; `is_member` is whether the actor is on its team
    Project { is_member: bool },

    /// A task; `is_member` refers to the task's project
    Task {
        is_member: bool,
        assignee_id: Option<i64>,
    },

    /// A comment on an existing task
    Comment,

    /// User stories of a project the actor may or may not belong to
    UserStory { is_member: bool },

    /// A user account
    User { user_id: i64, changes_role: bool },
}


/// How much of a resource an allowed update may touch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    /// Every field
    Full,

    /// Only the task status; other supplied fields are dropped
    StatusOnly,
}

/// Reason attached to a denial, surfaced to clients as the 403 message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenyReason {
    /// Operation requires Admin or Manager (or Admin for user management)
    InsufficientRole,

    /// Developer is not on the project's team
    NotProjectMember,

    /// Developer is neither assignee nor team member
    TaskNotVisible,

    /// Developer is not the task's assignee
    TaskNotAssigned,

    /// Non-admin touching another user's account
    NotAccountOwner,

    /// Non-admin trying to change a role
    RoleChangeNotAllowed,

    /// Admin trying to delete their own account
    SelfDeletion,
}

impl fmt::Display for DenyReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let message = match self {
            DenyReason::InsufficientRole => "Insufficient permissions",
            DenyReason::NotProjectMember => "Not a member of this project",
            DenyReason::TaskNotVisible => "Not authorized to view this task",
            DenyReason::TaskNotAssigned => "Not authorized to update this task",
            DenyReason::NotAccountOwner => "Not authorized to modify this user",
            DenyReason::RoleChangeNotAllowed => "Only admins can change user roles",
            DenyReason::SelfDeletion => "Cannot delete your own account",
        };
        f.write_str(message)
    }
}

/// Outcome of a policy evaluation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow(Access),
    Deny(DenyReason),
}

impl Decision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Decision::Allow(_))
    }

    pub fn into_result(self) -> Result<Access, DenyReason> {
        match self {
            Decision::Allow(access) => Ok(access),
            Decision::Deny(reason) => Err(reason),
        }
    }
}

/// Row scope for list queries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    /// No filtering
    All,

    /// Only rows the given user is linked to (team member, or assignee for
    /// tasks)
    Linked(i64),
}

const ALLOW: Decision = Decision::Allow(Access::Full);

fn require_privileged(actor: &Actor) -> Decision {
    if actor.is_privileged() {
        ALLOW
    } else {
        Decision::Deny(DenyReason::InsufficientRole)
    }
}

/// Decides whether `actor` may perform `operation` on `resource`
pub fn evaluate(actor: &Actor, operation: Operation, resource: &Resource) -> Decision {
    match *resource {
        Resource::Project { is_member } => match operation {
            Operation::Read if actor.is_privileged() || is_member => ALLOW,
            Operation::Read => Decision::Deny(DenyReason::NotProjectMember),
            Operation::Create | Operation::Update | Operation::Delete => {
                require_privileged(actor)
            }
        },

        Resource::Task {
            is_member,
            assignee_id,
        } => {
            let is_assignee = assignee_id == Some(actor.id);
            match operation {
                Operation::Create if actor.is_privileged() || is_member => ALLOW,
                Operation::Create => Decision::Deny(DenyReason::NotProjectMember),
                Operation::Read if actor.is_privileged() || is_member || is_assignee => ALLOW,
                Operation::Read => Decision::Deny(DenyReason::TaskNotVisible),
                Operation::Update if actor.is_privileged() => ALLOW,
                Operation::Update if is_assignee => Decision::Allow(Access::StatusOnly),
                Operation::Update => Decision::Deny(DenyReason::TaskNotAssigned),
                Operation::Delete => require_privileged(actor),
            }
        }

        // Only task existence is checked for comments.
        Resource::Comment => match operation {
            Operation::Read | Operation::Create => ALLOW,
            Operation::Update | Operation::Delete => require_privileged(actor),
        },

        Resource::UserStory { is_member } => match operation {
            Operation::Read if actor.is_privileged() || is_member => ALLOW,
            Operation::Read => Decision::Deny(DenyReason::NotProjectMember),
            Operation::Create | Operation::Update | Operation::Delete => {
                require_privileged(actor)
            }
        },

        Resource::User {
            user_id,
            changes_role,
        } => match operation {
            Operation::Read => ALLOW,
            Operation::Create | Operation::Update if actor.is_admin() => ALLOW,
            Operation::Create => Decision::Deny(DenyReason::InsufficientRole),
            Operation::Update if actor.id != user_id => {
                Decision::Deny(DenyReason::NotAccountOwner)
            }
            Operation::Update if changes_role => Decision::Deny(DenyReason::RoleChangeNotAllowed),
            Operation::Update => ALLOW,
            Operation::Delete if !actor.is_admin() => Decision::Deny(DenyReason::InsufficientRole),
            Operation::Delete if actor.id == user_id => Decision::Deny(DenyReason::SelfDeletion),
            Operation::Delete => ALLOW,
        },
    }
}

/// [`evaluate`] as a `Result`, for use with `?`
pub fn authorize(
    actor: &Actor,
    operation: Operation,
    resource: &Resource,
) -> Result<Access, DenyReason> {
    evaluate(actor, operation, resource).into_result()
}

/// Which rows of `kind` the actor may list
pub fn visibility(actor: &Actor, kind: ResourceKind) -> Visibility {
    match kind {
        ResourceKind::Project | ResourceKind::Task if !actor.is_privileged() => {
            Visibility::Linked(actor.id)
        }
        ResourceKind::Project | ResourceKind::Task => Visibility::All,
    }
}
