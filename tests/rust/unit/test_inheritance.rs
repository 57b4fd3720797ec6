//! Property collection across inheritance chains and duplicate handling

#[cfg(test)]
mod inheritance_tests {
    use ember::ember::Ember;
    use ember::model::SqlType;
    use ember::resource::{Field, Relationship, ResourceDef, ResourceError};

    fn column_names(ember: &mut Ember, name: &str) -> Vec<String> {
        ember
            .generate(name)
            .unwrap()
            .columns()
            .iter()
            .map(|c| c.name.clone())
            .collect()
    }

    #[test]
    fn test_subclass_copy_is_isolated_from_base() {
        let mut ember = Ember::default();
        ember
            .declare(ResourceDef::new("A").field("x", Field::integer()))
            .unwrap();
        ember.declare(ResourceDef::new("B").extends("A")).unwrap();
        ember.declare(ResourceDef::new("C").extends("A")).unwrap();

        ember
            .descriptor_mut("B")
            .unwrap()
            .field_mut("x")
            .unwrap()
            .column_options
            .unique = true;

        assert!(!ember.descriptor("A").unwrap().field("x").unwrap().column_options.unique);
        assert!(!ember.descriptor("C").unwrap().field("x").unwrap().column_options.unique);
        let declared = ember.resolve("A").unwrap();
        assert!(!declared.properties()[0].1.as_field().unwrap().column_options.unique);
        assert!(ember.descriptor("B").unwrap().field("x").unwrap().column_options.unique);
    }

    #[test]
    fn test_ancestor_columns_come_first() {
        let mut ember = Ember::default();
        ember
            .declare(
                ResourceDef::new("Entry")
                    .abstract_resource()
                    .field("created_at", Field::date_time())
                    .field("updated_at", Field::date_time()),
            )
            .unwrap();
        ember
            .declare(
                ResourceDef::new("Post")
                    .extends("Entry")
                    .field("title", Field::string(Some(200))),
            )
            .unwrap();

        assert_eq!(
            column_names(&mut ember, "Post"),
            vec!["id", "created_at", "updated_at", "title"]
        );
    }

    #[test]
    fn test_same_level_duplicates_are_rejected() {
        let mut ember = Ember::default();
        let err = ember
            .declare(
                ResourceDef::new("User")
                    .field("email", Field::text())
                    .field("email", Field::string(Some(64))),
            )
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Property 'email' already exists in resource 'User'."
        );

        let err = ember
            .declare(
                ResourceDef::new("Post")
                    .field("author", Field::integer())
                    .relationship("author", Relationship::many_to_one("User")),
            )
            .unwrap_err();
        assert!(matches!(err, ResourceError::DuplicateProperty { .. }));
    }

    #[test]
    fn test_subclass_may_shadow_inherited_property() {
        let mut ember = Ember::default();
        ember
            .declare(
                ResourceDef::new("User")
                    .field("role", Field::text())
                    .field("email", Field::text()),
            )
            .unwrap();
        ember
            .declare(
                ResourceDef::new("Admin")
                    .extends("User")
                    .field("role", Field::string(Some(16)).nullable(false)),
            )
            .unwrap();

        let admin = ember.generate("Admin").unwrap();
        let names: Vec<&str> = admin.columns().iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["id", "role", "email"]);
        let role = admin.table.as_ref().unwrap().column("role").unwrap();
        assert_eq!(role.sql_type, SqlType::String(Some(16)));
        assert!(!role.options.is_nullable());

        let user = ember.generate("User").unwrap();
        assert_eq!(
            user.table.as_ref().unwrap().column("role").unwrap().sql_type,
            SqlType::Text
        );
    }

    #[test]
    fn test_unknown_base_fails_declaration() {
        let mut ember = Ember::default();
        let err = ember
            .declare(ResourceDef::new("Post").extends("Entry"))
            .unwrap_err();
        assert!(matches!(err, ResourceError::HierarchyWalk { .. }));
        assert!(ember.resolve("Post").is_err());
    }

    #[test]
    fn test_methods_and_bases_reach_the_model() {
        let mut ember = Ember::default();
        ember
            .declare(
                ResourceDef::new("Entry")
                    .abstract_resource()
                    .mixin("Serializable")
                    .method("kind", |_| "entry".to_string())
                    .method("label", |model| format!("entry {}", model.name)),
            )
            .unwrap();
        ember
            .declare(
                ResourceDef::new("Post")
                    .extends("Entry")
                    .mixin("Searchable")
                    .doc("A blog post")
                    .method("kind", |_| "post".to_string()),
            )
            .unwrap();

        let post = ember.generate("Post").unwrap();
        assert_eq!(post.bases, vec!["Searchable".to_string(), "Model".to_string()]);
        assert_eq!(post.doc.as_deref(), Some("A blog post"));
        assert_eq!(post.method_names(), vec!["kind", "label"]);
        assert_eq!(post.call_method("kind").as_deref(), Some("post"));
        assert_eq!(post.call_method("label").as_deref(), Some("entry Post"));
        assert_eq!(post.call_method("missing"), None);
    }

    #[test]
    fn test_subclass_gets_its_own_key_for_inherited_one_to_many() {
        let mut ember = Ember::default();
        ember
            .declare(ResourceDef::new("Base").relationship("posts", Relationship::one_to_many("Post")))
            .unwrap();
        ember
            .declare(ResourceDef::new("Post").field("title", Field::text()))
            .unwrap();
        ember.declare(ResourceDef::new("Sub").extends("Base")).unwrap();

        let models = ember.generate_all().unwrap();
        assert_eq!(models.len(), 3);

        let post = ember.model("Post").unwrap();
        let table = post.table.as_ref().unwrap();
        let names: Vec<&str> = table.columns.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["id", "title", "base_id", "sub_id"]);
        assert_eq!(table.constraint("post_sub_id_fk").unwrap().referred_table, "sub");

        let base_posts = ember.model("Base").unwrap().relation("posts").unwrap().clone();
        assert_eq!(base_posts.back_populates.as_deref(), Some("base"));
        assert_eq!(base_posts.join_clauses[0].remote, "post.base_id");

        let sub_posts = ember.model("Sub").unwrap().relation("posts").unwrap().clone();
        assert_eq!(sub_posts.back_populates.as_deref(), Some("sub"));
        assert_eq!(sub_posts.join_clauses[0].local, "sub.id");
        assert_eq!(sub_posts.join_clauses[0].remote, "post.sub_id");

        // the declaration itself is untouched
        let declared = ember.resolve("Base").unwrap();
        assert_eq!(
            declared.properties()[0].1.as_relationship().unwrap().inverse_name(),
            None
        );
    }

    #[test]
    fn test_inherited_inverse_pointing_at_base_is_not_reused() {
        let mut ember = Ember::default();
        ember
            .declare(
                ResourceDef::new("Base")
                    .relationship("posts", Relationship::one_to_many("Post").inverse("author")),
            )
            .unwrap();
        ember
            .declare(
                ResourceDef::new("Post")
                    .relationship("author", Relationship::many_to_one("Base").inverse("posts")),
            )
            .unwrap();
        ember.declare(ResourceDef::new("Sub").extends("Base")).unwrap();

        let sub = ember.generate("Sub").unwrap();
        let post = ember.model("Post").unwrap();
        let names: Vec<&str> = post.columns().iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["id", "author_id", "sub_id"]);

        let sub_posts = sub.relation("posts").unwrap();
        assert_eq!(sub_posts.back_populates.as_deref(), Some("sub"));
        assert_eq!(sub_posts.join_clauses[0].remote, "post.sub_id");
        assert_eq!(
            ember.model("Base").unwrap().relation("posts").unwrap().join_clauses[0].remote,
            "post.author_id"
        );
    }
}
