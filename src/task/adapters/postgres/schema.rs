//! Diesel schema for record persistence.

diesel::table! {
    /// Records of every logical table, stored as JSON field maps.
    records (id) {
        /// Record identifier.
        id -> Uuid,
        /// Logical table the record belongs to.
        #[max_length = 255]
        table_name -> Varchar,
        /// Field values keyed by external field name.
        fields -> Jsonb,
        /// Creation timestamp; breaks ties between equal sort keys.
        created_at -> Timestamptz,
        /// Last update timestamp.
        updated_at -> Timestamptz,
    }
}
