//! Esquema Diesel (escrito a mano). Reemplazable con `diesel print-schema`.

diesel::table! {
    user_profiles (id) {
        id -> Uuid,
        full_name -> Nullable<Text>,
        date_of_birth -> Nullable<Date>,
        timezone -> Text,
        avatar_url -> Nullable<Text>,
        onboarding_completed -> Bool,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    questionnaire_responses (id) {
        id -> Uuid,
        user_id -> Uuid,
        step_number -> Integer,
        question_key -> Text,
        response_value -> Jsonb,
        created_at -> Timestamptz,
    }
}

diesel::joinable!(questionnaire_responses -> user_profiles (user_id));

diesel::allow_tables_to_appear_in_same_query!(
    questionnaire_responses,
    user_profiles,
);
