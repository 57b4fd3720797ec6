//! Foreign-key synthesis, mutual relationships and target resolution

#[cfg(test)]
mod relationship_tests {
    use ember::ember::Ember;
    use ember::model::{JoinClause, LazyMode, ReferentialAction, SqlType};
    use ember::resource::{Field, Relationship, ResourceDef, ResourceError};

    fn pair_and_link() -> Ember {
        let mut ember = Ember::default();
        ember
            .declare(
                ResourceDef::new("Pair")
                    .field("id_a", Field::integer().primary_key())
                    .field("id_b", Field::string(Some(8)).primary_key()),
            )
            .unwrap();
        ember
            .declare(ResourceDef::new("Link").relationship("pair", Relationship::many_to_one("Pair")))
            .unwrap();
        ember
    }

    #[test]
    fn test_composite_primary_key_gives_one_composite_constraint() {
        let mut ember = pair_and_link();
        let link = ember.generate("Link").unwrap();
        let table = link.table.as_ref().unwrap();

        let names: Vec<&str> = table.columns.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["id", "pair_id_a", "pair_id_b"]);
        assert_eq!(table.column("pair_id_b").unwrap().sql_type, SqlType::String(Some(8)));

        assert_eq!(table.constraints.len(), 1);
        let fk = &table.constraints[0];
        assert_eq!(fk.name, "link_pair_id_a_pair_id_b_fk");
        assert_eq!(fk.columns, vec!["pair_id_a", "pair_id_b"]);
        assert_eq!(fk.referred_table, "pair");
        assert_eq!(fk.qualified_references(), vec!["pair.id_a", "pair.id_b"]);
        assert_eq!(fk.on_update, Some(ReferentialAction::Cascade));

        let relation = link.relation("pair").unwrap();
        assert_eq!(relation.lazy, LazyMode::Select);
        assert!(!relation.use_list);
        assert_eq!(relation.join_clauses.len(), 2);

        // Pair was compiled together with Link
        assert!(ember.model("Pair").is_some());
    }

    #[test]
    fn test_mutual_one_to_one_only_non_primary_side_gets_key() {
        let mut ember = Ember::default();
        ember
            .declare(
                ResourceDef::new("User").relationship(
                    "profile",
                    Relationship::one_to_one("Profile").inverse("user").primary(),
                ),
            )
            .unwrap();
        ember
            .declare(
                ResourceDef::new("Profile")
                    .field("bio", Field::text())
                    .relationship("user", Relationship::one_to_one("User").inverse("profile")),
            )
            .unwrap();

        let user = ember.generate("User").unwrap();
        let profile = ember.model("Profile").unwrap();

        let user_table = user.table.as_ref().unwrap();
        assert_eq!(user_table.columns.len(), 1);
        assert!(user_table.constraints.is_empty());

        let profile_table = profile.table.as_ref().unwrap();
        assert!(profile_table.column("user_id").is_some());
        assert_eq!(profile_table.constraints[0].name, "profile_user_id_fk");

        let to_profile = user.relation("profile").unwrap();
        assert_eq!(to_profile.back_populates.as_deref(), Some("user"));
        assert_eq!(
            to_profile.join_clauses,
            vec![JoinClause {
                local: "user.id".to_string(),
                remote: "profile.user_id".to_string(),
            }]
        );
        let to_user = profile.relation("user").unwrap();
        assert_eq!(
            to_user.join_clauses,
            vec![JoinClause {
                local: "profile.user_id".to_string(),
                remote: "user.id".to_string(),
            }]
        );
    }

    #[test]
    fn test_mutual_foreign_keys_compile_together() {
        let mut ember = Ember::default();
        ember
            .declare(
                ResourceDef::new("Department")
                    .relationship("manager", Relationship::many_to_one("Employee")),
            )
            .unwrap();
        ember
            .declare(
                ResourceDef::new("Employee")
                    .relationship("department", Relationship::many_to_one("Department")),
            )
            .unwrap();

        let department = ember.generate("Department").unwrap();
        let employee = ember.model("Employee").unwrap();
        assert_eq!(
            department.table.as_ref().unwrap().constraints[0].name,
            "department_manager_id_fk"
        );
        assert_eq!(
            employee.table.as_ref().unwrap().constraints[0].name,
            "employee_department_id_fk"
        );
    }

    #[test]
    fn test_one_to_many_pairs_with_declared_inverse() {
        let mut ember = Ember::default();
        ember
            .declare(
                ResourceDef::new("UserAccount")
                    .relationship("posts", Relationship::one_to_many("Post").inverse("author")),
            )
            .unwrap();
        ember
            .declare(
                ResourceDef::new("Post").relationship(
                    "author",
                    Relationship::many_to_one("UserAccount")
                        .inverse("posts")
                        .on_delete(ReferentialAction::SetNull),
                ),
            )
            .unwrap();

        let user = ember.generate("UserAccount").unwrap();
        let post = ember.model("Post").unwrap();

        let posts = user.relation("posts").unwrap();
        assert_eq!(posts.lazy, LazyMode::Dynamic);
        assert!(posts.use_list);
        assert_eq!(posts.back_populates.as_deref(), Some("author"));
        assert_eq!(posts.join_clauses[0].remote, "post.author_id");

        let fk = &post.table.as_ref().unwrap().constraints[0];
        assert_eq!(fk.name, "post_author_id_fk");
        assert_eq!(fk.referred_table, "user_account");
        assert_eq!(fk.on_delete, Some(ReferentialAction::SetNull));
        assert!(user.table.as_ref().unwrap().constraints.is_empty());
    }

    #[test]
    fn test_one_to_many_without_inverse_synthesizes_key_owner() {
        let mut ember = Ember::default();
        ember
            .declare(
                ResourceDef::new("UserAccount")
                    .relationship("posts", Relationship::one_to_many("Post")),
            )
            .unwrap();
        ember
            .declare(ResourceDef::new("Post").field("title", Field::text()))
            .unwrap();

        ember.generate("UserAccount").unwrap();
        let post = ember.model("Post").unwrap();
        let table = post.table.as_ref().unwrap();
        assert!(table.column("user_account_id").is_some());
        assert_eq!(table.constraints[0].name, "post_user_account_id_fk");
        assert_eq!(
            post.relation("user_account").unwrap().back_populates.as_deref(),
            Some("posts")
        );
    }

    #[test]
    fn test_self_reference() {
        let mut ember = Ember::default();
        ember
            .declare(
                ResourceDef::new("Category")
                    .relationship("parent", Relationship::many_to_one("Category")),
            )
            .unwrap();

        let category = ember.generate("Category").unwrap();
        let fk = &category.table.as_ref().unwrap().constraints[0];
        assert_eq!(fk.name, "category_parent_id_fk");
        assert_eq!(fk.referred_table, "category");
    }

    #[test]
    fn test_forward_reference_resolves_once_declared() {
        let mut ember = Ember::default();
        ember
            .declare(
                ResourceDef::new("Post")
                    .relationship("author", Relationship::many_to_one("Author")),
            )
            .unwrap();

        let err = ember.generate("Post").unwrap_err();
        assert!(matches!(err, ResourceError::UnresolvedTarget { .. }));
        assert!(err.to_string().contains("Couldn't resolve target: 'Author"));
        assert!(err.to_string().contains("relationship 'author' on resource 'Post'"));
        assert!(ember.model("Post").is_none());

        ember.declare(ResourceDef::new("Author")).unwrap();
        let post = ember.generate("Post").unwrap();
        assert!(post.table.as_ref().unwrap().column("author_id").is_some());
    }

    #[test]
    fn test_ambiguous_one_to_one_pair_is_rejected() {
        let mut ember = Ember::default();
        ember
            .declare(
                ResourceDef::new("User").relationship(
                    "profile",
                    Relationship::one_to_one("Profile").inverse("user").primary(),
                ),
            )
            .unwrap();
        ember
            .declare(
                ResourceDef::new("Profile").relationship(
                    "user",
                    Relationship::one_to_one("User").inverse("profile").primary(),
                ),
            )
            .unwrap();

        let err = ember.generate("Profile").unwrap_err();
        assert!(matches!(err, ResourceError::InvalidPrimarySide { .. }));
        assert!(ember.models().is_empty());
    }

    #[test]
    fn test_identified_resource_can_be_referenced_before_its_declaration() {
        let mut ember = Ember::default();
        ember
            .declare(
                ResourceDef::new("Post")
                    .relationship("profile", Relationship::many_to_one("Profile")),
            )
            .unwrap();
        ember
            .declare(
                ResourceDef::new("Avatar")
                    .relationship("profile", Relationship::one_to_one("Profile").identifying()),
            )
            .unwrap();
        ember.declare(ResourceDef::new("User")).unwrap();
        ember
            .declare(
                ResourceDef::new("Profile")
                    .relationship("user", Relationship::one_to_one("User").identifying()),
            )
            .unwrap();

        // Avatar's key copies Profile's, which copies User's
        let avatar = ember.generate("Avatar").unwrap();
        let avatar_table = avatar.table.as_ref().unwrap();
        let names: Vec<&str> = avatar_table.columns.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["profile_user_id"]);
        assert!(avatar_table.column("profile_user_id").unwrap().is_primary_key());

        let profile = ember.model("Profile").unwrap();
        let profile_table = profile.table.as_ref().unwrap();
        assert_eq!(profile_table.primary_key_columns().len(), 1);
        assert!(profile_table.column("user_id").unwrap().is_primary_key());

        let post = ember.generate("Post").unwrap();
        let post_table = post.table.as_ref().unwrap();
        assert!(!post_table.column("profile_user_id").unwrap().is_primary_key());
        let fk = &post_table.constraints[0];
        assert_eq!(fk.name, "post_profile_user_id_fk");
        assert_eq!(fk.referred_table, "profile");
        assert_eq!(fk.referred_columns, vec!["user_id"]);
    }

    #[test]
    fn test_primary_side_joins_on_its_own_inverse_key() {
        let mut ember = Ember::default();
        ember
            .declare(
                ResourceDef::new("UserAccount")
                    .relationship("posts", Relationship::one_to_many("Post").inverse("author")),
            )
            .unwrap();
        ember
            .declare(
                ResourceDef::new("Post")
                    .relationship(
                        "author_backup",
                        Relationship::many_to_one("UserAccount"),
                    )
                    .relationship(
                        "author",
                        Relationship::many_to_one("UserAccount").inverse("posts"),
                    ),
            )
            .unwrap();

        let user = ember.generate("UserAccount").unwrap();
        let post = ember.model("Post").unwrap();
        assert_eq!(post.table.as_ref().unwrap().constraints.len(), 2);

        assert_eq!(
            user.relation("posts").unwrap().join_clauses,
            vec![JoinClause {
                local: "user_account.id".to_string(),
                remote: "post.author_id".to_string(),
            }]
        );
    }

    #[test]
    fn test_one_to_many_into_generated_model_is_rejected() {
        let mut ember = Ember::default();
        ember.declare(ResourceDef::new("Post")).unwrap();
        ember.generate("Post").unwrap();

        ember
            .declare(
                ResourceDef::new("UserAccount")
                    .relationship("posts", Relationship::one_to_many("Post")),
            )
            .unwrap();
        let err = ember.generate("UserAccount").unwrap_err();
        assert!(matches!(err, ResourceError::InvalidInverse { .. }));
        assert!(ember.model("UserAccount").is_none());
    }
}
