table! {
    comments (id) {
        id -> Int4,
        post_id -> Nullable<Int4>,
        author_id -> Nullable<Int4>,
        text -> Text,
        creation_date -> Timestamp,
    }
}

table! {
    follows (id) {
        id -> Int4,
        user_id -> Int4,
        author_id -> Int4,
    }
}

table! {
    groups (id) {
        id -> Int4,
        title -> Varchar,
        slug -> Varchar,
        description -> Text,
    }
}

table! {
    posts (id) {
        id -> Int4,
        text -> Text,
        creation_date -> Timestamp,
        author_id -> Int4,
        group_id -> Nullable<Int4>,
        image -> Nullable<Text>,
    }
}

table! {
    users (id) {
        id -> Int4,
        username -> Varchar,
        display_name -> Varchar,
        email -> Text,
        hashed_password -> Nullable<Text>,
        creation_date -> Timestamp,
    }
}

joinable!(posts -> users (author_id));

allow_tables_to_appear_in_same_query!(comments, follows, groups, posts, users,);
