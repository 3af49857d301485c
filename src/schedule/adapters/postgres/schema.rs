//! Diesel schema for task graph persistence.

diesel::table! {
    /// Task records with derived scheduling attributes.
    tasks (id) {
        /// Storage-assigned task identifier.
        id -> Int8,
        /// Task title.
        #[max_length = 255]
        title -> Varchar,
        /// Optional due date.
        due_at -> Nullable<Timestamptz>,
        /// Creation timestamp.
        created_at -> Timestamptz,
        /// Derived earliest-start date, unset until first derived.
        earliest_start -> Nullable<Timestamptz>,
        /// Derived critical-path flag.
        is_critical -> Bool,
    }
}

diesel::table! {
    /// Many-to-many dependency edges between tasks.
    task_dependencies (dependent_id, dependency_id) {
        /// The task that waits.
        dependent_id -> Int8,
        /// The task that must finish first.
        dependency_id -> Int8,
    }
}

diesel::allow_tables_to_appear_in_same_query!(tasks, task_dependencies);
