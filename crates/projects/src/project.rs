use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use projtrack_auth::Owned;
use projtrack_core::{DomainError, DomainResult, ProjectId, UserId};

use crate::input::{NewProject, ProjectFields};
use crate::module::{Module, ModuleId, ModuleName};

/// Aggregate root: Project.
///
/// # Invariants
/// - `external_id` is globally unique (enforced by the store).
/// - Modules live only inside their project and are addressed positionally by
///   callers; internally each carries a stable [`ModuleId`].
/// - `module_count` moves by exactly one on module add/delete and never drops
///   below zero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub id: ProjectId,
    pub external_id: String,
    pub name: String,
    pub description: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    /// Denormalized counter; see [`Project::set_fields`] for the one place it is
    /// overwritten wholesale.
    pub module_count: u32,
    pub owner: UserId,
    pub modules: Vec<Module>,
    /// Next [`ModuleId`] to hand out.
    pub next_module_id: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Completion summary for a project's modules.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Progress {
    pub total: usize,
    pub done: usize,
    /// Rounded percentage, 0 for a project without modules.
    pub percent: u8,
}

impl Project {
    pub fn new(id: ProjectId, new: NewProject, owner: UserId, now: DateTime<Utc>) -> Self {
        let NewProject {
            external_id,
            fields,
        } = new;
        Self {
            id,
            external_id,
            name: fields.name,
            description: fields.description,
            start_date: fields.start_date,
            end_date: fields.end_date,
            module_count: fields.module_count,
            owner,
            modules: Vec::new(),
            next_module_id: 1,
            created_at: now,
            updated_at: now,
        }
    }

    /// Overwrite the editable fields, including the module counter.
    ///
    /// The counter is taken from the caller as-is, which can desynchronize it from
    /// `modules.len()`.
    pub fn set_fields(&mut self, fields: ProjectFields, now: DateTime<Utc>) {
        self.name = fields.name;
        self.description = fields.description;
        self.start_date = fields.start_date;
        self.end_date = fields.end_date;
        self.module_count = fields.module_count;
        self.updated_at = now;
    }

    /// Move ownership to `new_owner`, returning the previous owner if it changed.
    pub fn reassign(&mut self, new_owner: UserId, now: DateTime<Utc>) -> Option<UserId> {
        if self.owner == new_owner {
            return None;
        }
        let previous = std::mem::replace(&mut self.owner, new_owner);
        self.updated_at = now;
        Some(previous)
    }

    /// Append a module assigned by `by`.
    pub fn push_module(&mut self, name: ModuleName, by: UserId, now: DateTime<Utc>) -> &Module {
        let id = ModuleId(self.next_module_id);
        self.next_module_id += 1;
        self.modules.push(Module {
            id,
            name: name.into_string(),
            done: false,
            assigned_by: by,
            assigned_at: now,
        });
        self.module_count = self.module_count.saturating_add(1);
        self.updated_at = now;

        &self.modules[self.modules.len() - 1]
    }

    /// Module at `index`; out-of-range is an error, never a no-op.
    pub fn module_at(&self, index: usize) -> DomainResult<&Module> {
        self.modules
            .get(index)
            .ok_or(DomainError::not_found("module"))
    }

    pub fn position_of(&self, id: ModuleId) -> Option<usize> {
        self.modules.iter().position(|m| m.id == id)
    }

    /// Flip `done` on the module with `id`; returns the new value.
    pub fn toggle_module(&mut self, id: ModuleId, now: DateTime<Utc>) -> DomainResult<bool> {
        let idx = self
            .position_of(id)
            .ok_or(DomainError::not_found("module"))?;
        let module = &mut self.modules[idx];
        module.done = !module.done;
        self.updated_at = now;
        Ok(module.done)
    }

    /// Remove the module with `id`; later modules shift down by one.
    pub fn remove_module(&mut self, id: ModuleId, now: DateTime<Utc>) -> DomainResult<Module> {
        let idx = self
            .position_of(id)
            .ok_or(DomainError::not_found("module"))?;
        let removed = self.modules.remove(idx);
        self.module_count = self.module_count.saturating_sub(1);
        self.updated_at = now;
        Ok(removed)
    }

    pub fn toggle_module_at(&mut self, index: usize, now: DateTime<Utc>) -> DomainResult<bool> {
        let id = self.module_at(index)?.id;
        self.toggle_module(id, now)
    }

    pub fn remove_module_at(&mut self, index: usize, now: DateTime<Utc>) -> DomainResult<Module> {
        let id = self.module_at(index)?.id;
        self.remove_module(id, now)
    }

    pub fn progress(&self) -> Progress {
        let total = self.modules.len();
        let done = self.modules.iter().filter(|m| m.done).count();
        let percent = if total == 0 {
            0
        } else {
            ((done * 100 + total / 2) / total) as u8
        };
        Progress {
            total,
            done,
            percent,
        }
    }
}

impl Owned for Project {
    fn owner(&self) -> UserId {
        self.owner
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn now() -> DateTime<Utc> {
        Utc::now()
    }

    fn name(raw: &str) -> ModuleName {
        ModuleName::parse(raw).unwrap()
    }

    fn project_with(modules: &[&str]) -> Project {
        let owner = UserId::new();
        let mut p = Project::new(
            ProjectId::new(),
            NewProject {
                external_id: "Pro1001".to_string(),
                fields: ProjectFields {
                    name: "Billing".to_string(),
                    ..ProjectFields::default()
                },
            },
            owner,
            now(),
        );
        for m in modules {
            p.push_module(name(m), owner, now());
        }
        p
    }

    #[test]
    fn push_module_appends_and_counts() {
        let mut p = project_with(&[]);
        let by = UserId::new();
        let module = p.push_module(name("  Design DB "), by, now()).clone();

        assert_eq!(module.name, "Design DB");
        assert!(!module.done);
        assert_eq!(module.assigned_by, by);
        assert_eq!(p.modules.len(), 1);
        assert_eq!(p.module_count, 1);
    }

    #[test]
    fn module_ids_are_never_reused() {
        let mut p = project_with(&["a", "b"]);
        let last = p.modules[1].id;
        p.remove_module_at(1, now()).unwrap();
        let fresh = p.push_module(name("c"), UserId::new(), now()).id;
        assert!(fresh > last);
    }

    #[test]
    fn out_of_range_index_is_not_found_and_changes_nothing() {
        let mut p = project_with(&["a", "b", "c"]);
        let before = p.clone();

        assert_eq!(
            p.remove_module_at(5, now()).unwrap_err(),
            DomainError::NotFound("module")
        );
        assert_eq!(
            p.toggle_module_at(3, now()).unwrap_err(),
            DomainError::NotFound("module")
        );
        assert_eq!(p, before);
    }

    #[test]
    fn remove_floors_counter_at_zero() {
        let mut p = project_with(&["a"]);
        p.module_count = 0;
        let removed = p.remove_module_at(0, now()).unwrap();
        assert_eq!(removed.name, "a");
        assert_eq!(p.module_count, 0);
    }

    #[test]
    fn reassign_reports_previous_owner_only_on_change() {
        let mut p = project_with(&[]);
        let original = p.owner;
        assert_eq!(p.reassign(original, now()), None);

        let next = UserId::new();
        assert_eq!(p.reassign(next, now()), Some(original));
        assert_eq!(p.owner, next);
    }

    #[test]
    fn set_fields_overwrites_counter() {
        let mut p = project_with(&["a", "b"]);
        p.set_fields(
            ProjectFields {
                name: "Renamed".to_string(),
                module_count: 9,
                ..ProjectFields::default()
            },
            now(),
        );
        assert_eq!(p.name, "Renamed");
        assert_eq!(p.module_count, 9);
        assert_eq!(p.modules.len(), 2);
    }

    #[test]
    fn progress_rounds_percentage() {
        let mut p = project_with(&[]);
        assert_eq!(p.progress().percent, 0);

        let mut p3 = project_with(&["a", "b", "c"]);
        p3.toggle_module_at(0, now()).unwrap();
        assert_eq!(
            p3.progress(),
            Progress {
                total: 3,
                done: 1,
                percent: 33
            }
        );
        p3.toggle_module_at(1, now()).unwrap();
        assert_eq!(p3.progress().percent, 67);

        p.push_module(name("x"), UserId::new(), now());
        p.toggle_module_at(0, now()).unwrap();
        assert_eq!(p.progress().percent, 100);
    }

    #[cfg(test)]
    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        fn names() -> impl Strategy<Value = Vec<String>> {
            prop::collection::vec("[a-z]{1,8}", 0..12)
        }

        proptest! {
            #![proptest_config(ProptestConfig {
                cases: 256,
                ..ProptestConfig::default()
            })]

            /// Property: add then delete at the last index restores the counter.
            #[test]
            fn add_then_delete_last_restores_count(existing in names(), extra in "[a-z]{1,8}") {
                let refs: Vec<&str> = existing.iter().map(String::as_str).collect();
                let mut p = project_with(&refs);
                let before = p.module_count;

                p.push_module(name(&extra), UserId::new(), now());
                let last = p.modules.len() - 1;
                let removed = p.remove_module_at(last, now()).unwrap();

                prop_assert_eq!(removed.name, extra);
                prop_assert_eq!(p.module_count, before);
            }

            /// Property: toggling the same index twice is the identity on modules.
            #[test]
            fn toggle_is_an_involution(existing in names(), pick in any::<prop::sample::Index>()) {
                prop_assume!(!existing.is_empty());
                let refs: Vec<&str> = existing.iter().map(String::as_str).collect();
                let mut p = project_with(&refs);
                let idx = pick.index(p.modules.len());
                let before = p.clone();

                p.toggle_module_at(idx, now()).unwrap();
                p.toggle_module_at(idx, now()).unwrap();

                prop_assert_eq!(&p.modules, &before.modules);
                prop_assert_eq!(p.module_count, before.module_count);
                prop_assert_eq!(p.owner, before.owner);
                prop_assert_eq!(&p.name, &before.name);
            }

            /// Property: deleting index i shifts later modules down and keeps earlier ones.
            #[test]
            fn delete_shifts_later_modules_down(existing in names(), pick in any::<prop::sample::Index>()) {
                prop_assume!(!existing.is_empty());
                let refs: Vec<&str> = existing.iter().map(String::as_str).collect();
                let mut p = project_with(&refs);
                let i = pick.index(p.modules.len());
                let before = p.modules.clone();

                p.remove_module_at(i, now()).unwrap();

                prop_assert_eq!(&p.modules[..i], &before[..i]);
                prop_assert_eq!(&p.modules[i..], &before[i + 1..]);
            }
        }
    }
}
