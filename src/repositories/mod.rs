pub(crate) mod classes;
pub(crate) mod classifications;
pub(crate) mod students;
pub(crate) mod subjects;
pub(crate) mod task_statuses;
pub(crate) mod tasks;
pub(crate) mod teacher_assignments;
pub(crate) mod teachers;
pub(crate) mod users;
