//! Role capabilities.
//!
//! Admins may do anything. Teachers read the school directory and write what
//! they own: their classes, attendance in those classes, and their
//! assignments with the submissions against them. Parents only read what
//! concerns their own children.

use std::collections::HashSet;

use crate::database::models::{Entity, SchoolClass, Student, User};
use crate::database::Storage;
use crate::error::ApiError;
use crate::types::Role;

/// The authenticated user for the current request
#[derive(Clone, Debug)]
pub struct CurrentUser {
    pub user: User,
    /// Teacher profile id, when the user is a teacher with a profile
    pub teacher_id: Option<String>,
}

impl CurrentUser {
    pub fn id(&self) -> &str {
        &self.user.id
    }

    pub fn role(&self) -> Role {
        self.user.role
    }

    pub fn is_admin(&self) -> bool {
        self.role() == Role::Admin
    }

    pub fn require(&self, allowed: &[Role]) -> Result<(), ApiError> {
        if allowed.contains(&self.role()) {
            Ok(())
        } else {
            Err(forbidden())
        }
    }

    pub fn require_admin(&self) -> Result<(), ApiError> {
        self.require(&[Role::Admin])
    }

    /// Admins and teachers
    pub fn require_staff(&self) -> Result<(), ApiError> {
        self.require(&[Role::Admin, Role::Teacher])
    }

    /// Admins pass; teachers only for their own teacher id
    pub fn require_teacher(&self, teacher_id: &str) -> Result<(), ApiError> {
        if self.is_admin() || self.teacher_id.as_deref() == Some(teacher_id) {
            Ok(())
        } else {
            Err(forbidden())
        }
    }

    /// Admins pass; teachers only for a class assigned to them
    pub fn require_class_owner(&self, class: &SchoolClass) -> Result<(), ApiError> {
        match &class.teacher_id {
            Some(owner) => self.require_teacher(owner),
            None if self.is_admin() => Ok(()),
            None => Err(forbidden()),
        }
    }

    /// Same as [`require_class_owner`](Self::require_class_owner), by class id
    pub async fn require_class_teacher(&self, storage: &dyn Storage, class_id: &str) -> Result<(), ApiError> {
        if self.is_admin() {
            return Ok(());
        }
        let class = storage
            .get_class(class_id)
            .await?
            .ok_or_else(|| ApiError::invalid_field("classId", "does not reference an existing record"))?;
        self.require_class_owner(&class)
    }

    /// What this user may read. Staff see everything; parents see their
    /// children and the classes those children attend.
    pub async fn scope(&self, storage: &dyn Storage) -> Result<Scope, ApiError> {
        match self.role() {
            Role::Admin | Role::Teacher => Ok(Scope::All),
            Role::Parent => {
                let children = storage.list_students_by_parent(self.id()).await?;
                Ok(Scope::family(&children))
            }
        }
    }
}

/// Read visibility computed per request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scope {
    All,
    Family {
        student_ids: HashSet<String>,
        class_ids: HashSet<String>,
    },
}

impl Scope {
    pub fn family(children: &[Student]) -> Self {
        Scope::Family {
            student_ids: children.iter().map(|s| s.id().to_string()).collect(),
            class_ids: children.iter().filter_map(|s| s.class_id.clone()).collect(),
        }
    }

    pub fn allows_student(&self, student_id: &str) -> bool {
        match self {
            Scope::All => true,
            Scope::Family { student_ids, .. } => student_ids.contains(student_id),
        }
    }

    pub fn allows_class(&self, class_id: &str) -> bool {
        match self {
            Scope::All => true,
            Scope::Family { class_ids, .. } => class_ids.contains(class_id),
        }
    }

    pub fn require_student(&self, student_id: &str) -> Result<(), ApiError> {
        if self.allows_student(student_id) {
            Ok(())
        } else {
            Err(forbidden())
        }
    }

    pub fn require_class(&self, class_id: &str) -> Result<(), ApiError> {
        if self.allows_class(class_id) {
            Ok(())
        } else {
            Err(forbidden())
        }
    }

    /// Keep the rows whose student is visible
    pub fn students<T>(&self, rows: Vec<T>, student_id: impl Fn(&T) -> &str) -> Vec<T> {
        match self {
            Scope::All => rows,
            _ => rows.into_iter().filter(|r| self.allows_student(student_id(r))).collect(),
        }
    }

    /// Keep the rows whose class is visible
    pub fn classes<T>(&self, rows: Vec<T>, class_id: impl Fn(&T) -> &str) -> Vec<T> {
        match self {
            Scope::All => rows,
            _ => rows.into_iter().filter(|r| self.allows_class(class_id(r))).collect(),
        }
    }
}

pub fn forbidden() -> ApiError {
    ApiError::forbidden("You do not have permission to perform this action")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::models::{new_id, NewStudent, NewUser};
    use crate::types::StudentStatus;
    use chrono::{NaiveDate, Utc};

    fn current(role: Role, teacher_id: Option<&str>) -> CurrentUser {
        CurrentUser {
            user: NewUser { role, ..Default::default() }.into_row(new_id(), Utc::now()),
            teacher_id: teacher_id.map(String::from),
        }
    }

    fn child(class_id: Option<&str>) -> Student {
        let d = NaiveDate::from_ymd_opt(2015, 1, 1).unwrap();
        NewStudent {
            student_id: new_id(),
            first_name: "A".into(),
            last_name: "B".into(),
            date_of_birth: d,
            class_id: class_id.map(String::from),
            parent_id: None,
            admission_date: d,
            status: StudentStatus::Active,
            roll_number: None,
        }
        .into_row(new_id(), Utc::now())
    }

    #[test]
    fn role_gates() {
        assert!(current(Role::Admin, None).require_staff().is_ok());
        assert!(current(Role::Teacher, None).require_staff().is_ok());
        let err = current(Role::Parent, None).require_staff().unwrap_err();
        assert_eq!(err.status_code(), 403);
        assert!(current(Role::Teacher, None).require_admin().is_err());
    }

    #[test]
    fn teachers_only_act_for_themselves() {
        let teacher = current(Role::Teacher, Some("t1"));
        assert!(teacher.require_teacher("t1").is_ok());
        assert!(teacher.require_teacher("t2").is_err());
        assert!(current(Role::Admin, None).require_teacher("t2").is_ok());
        assert!(current(Role::Teacher, None).require_teacher("t1").is_err());
    }

    #[test]
    fn family_scope_filters_rows() {
        let kids = vec![child(Some("c1")), child(None)];
        let scope = Scope::family(&kids);
        assert!(scope.allows_student(&kids[0].id));
        assert!(scope.allows_class("c1"));
        assert!(!scope.allows_class("c2"));

        let others = vec![child(Some("c1")), kids[1].clone()];
        let visible = scope.students(others, |s| s.id.as_str());
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].id, kids[1].id);
    }
}
