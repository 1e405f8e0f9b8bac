diesel::table! {
    categories (id) {
        id -> Integer,
        name -> Text,
        slug -> Text,
        created_at -> Text,
        updated_at -> Text,
    }
}

diesel::table! {
    entries (id) {
        id -> Integer,
        name -> Text,
        slug -> Text,
        description -> Text,
        category_id -> Integer,
        source_url -> Text,
        registry_url -> Text,
        pros -> Nullable<Text>,
        cons -> Nullable<Text>,
        install_command -> Nullable<Text>,
        install_alt_command -> Nullable<Text>,
        code_example -> Nullable<Text>,
        stars -> Nullable<BigInt>,
        forks -> Nullable<BigInt>,
        watchers -> Nullable<BigInt>,
        open_issues -> Nullable<BigInt>,
        last_commit_at -> Nullable<Text>,
        popularity_score -> Nullable<Integer>,
        maintenance_score -> Nullable<Integer>,
        last_synced_at -> Nullable<Text>,
        created_at -> Text,
        updated_at -> Text,
    }
}

diesel::joinable!(entries -> categories (category_id));

diesel::allow_tables_to_appear_in_same_query!(categories, entries,);
