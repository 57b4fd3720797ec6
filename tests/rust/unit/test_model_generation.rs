//! Model generation: naming, caching, abstract resources and host initialization

#[cfg(test)]
mod model_generation_tests {
    use std::sync::Arc;

    use ember::config::CompilerConfig;
    use ember::ember::{get_ember, Application, Ember, HostApp, EXTENSION_NAME};
    use ember::model::{GeneratedModel, MappedProperty};
    use ember::resource::{Field, Relationship, ResourceDef, ResourceError};
    use ember::utils::naming::named_generator;

    #[test]
    fn test_default_table_name_is_snake_case() {
        let mut ember = Ember::default();
        ember.declare(ResourceDef::new("UserAccount")).unwrap();
        ember
            .declare(ResourceDef::new("Person").tablename("users"))
            .unwrap();

        assert_eq!(
            ember.generate("UserAccount").unwrap().tablename(),
            Some("user_account")
        );
        assert_eq!(ember.generate("Person").unwrap().tablename(), Some("users"));
    }

    #[test]
    fn test_configured_and_per_resource_generators() {
        let mut ember = Ember::new(CompilerConfig {
            tablename_generator: "upper_snake_case".to_string(),
            schema: Some("app".to_string()),
            ..Default::default()
        });
        ember.declare(ResourceDef::new("OrderLine")).unwrap();
        ember
            .declare(
                ResourceDef::new("AuditEntry")
                    .tablename_generator(named_generator("lower_case").unwrap()),
            )
            .unwrap();

        let order_line = ember.generate("OrderLine").unwrap();
        assert_eq!(order_line.tablename(), Some("ORDER_LINE"));
        assert_eq!(order_line.table.as_ref().unwrap().fullname(), "app.ORDER_LINE");
        assert_eq!(
            ember.generate("AuditEntry").unwrap().tablename(),
            Some("auditentry")
        );
    }

    #[test]
    fn test_generate_returns_the_cached_model() {
        let mut ember = Ember::default();
        ember
            .declare(ResourceDef::new("Tag").field("label", Field::text()))
            .unwrap();

        let first = ember.generate("Tag").unwrap();
        let second = ember.generate("Tag").unwrap();
        assert!(GeneratedModel::same_model(&first, &second));

        let all = ember.generate_all().unwrap();
        assert!(Arc::ptr_eq(&all[0], &first));
        assert_eq!(ember.models().len(), 1);
        assert!(ember.descriptor("Tag").unwrap().is_model_generated());
    }

    #[test]
    fn test_columns_and_mapped_properties() {
        let mut ember = Ember::default();
        ember
            .declare(
                ResourceDef::new("Product")
                    .field("sku", Field::string(Some(32)).unique().nullable(false))
                    .field("price", Field::numeric(10, 2).default_value("0"))
                    .field("name", Field::text().index()),
            )
            .unwrap();

        let product = ember.generate("Product").unwrap();
        let table = product.table.as_ref().unwrap();
        let names: Vec<&str> = table.columns.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["id", "sku", "price", "name"]);
        assert!(table.column("id").unwrap().is_primary_key());
        assert!(table.column("sku").unwrap().options.unique);
        assert_eq!(
            table.column("price").unwrap().options.default.as_deref(),
            Some("0")
        );
        assert_eq!(
            product.property("sku"),
            Some(&MappedProperty::Column {
                name: "sku".to_string(),
                column: "sku".to_string()
            })
        );
        assert_eq!(product.properties.len(), 4);
    }

    #[test]
    fn test_abstract_resources() {
        let mut ember = Ember::default();
        ember
            .declare(
                ResourceDef::new("Entry")
                    .abstract_resource()
                    .field("created_at", Field::date_time()),
            )
            .unwrap();
        ember.declare(ResourceDef::new("Note")).unwrap();

        let entry = ember.generate("Entry").unwrap();
        assert!(entry.is_abstract);
        assert_eq!(entry.tablename(), None);
        assert_eq!(entry.columns()[0].name, "created_at");

        let forced = ember.generate_abstract("Note").unwrap();
        assert!(forced.is_abstract);
        assert!(forced.table.is_none());
        assert!(Arc::ptr_eq(&forced, &ember.generate("Note").unwrap()));
    }

    #[test]
    fn test_failed_generation_caches_nothing() {
        let mut ember = Ember::new(CompilerConfig {
            auto_primary_key: false,
            ..Default::default()
        });
        ember
            .declare(ResourceDef::new("Tag").field("label", Field::text()))
            .unwrap();
        ember
            .declare(ResourceDef::new("Post").relationship("tag", Relationship::many_to_one("Tag")))
            .unwrap();

        let err = ember.generate("Post").unwrap_err();
        assert!(matches!(err, ResourceError::MissingPrimaryKey { .. }));
        assert!(ember.model("Post").is_none());
        assert!(ember.model("Tag").is_none());
        assert!(!ember.descriptor("Post").unwrap().is_model_generated());

        // Tag alone has nothing to reference and compiles fine
        assert!(ember.generate("Tag").is_ok());
    }

    #[test]
    fn test_init_app_is_idempotent() {
        let mut ember = Ember::default();
        ember
            .declare(ResourceDef::new("UserAccount").field("email", Field::text()))
            .unwrap();
        let mut app = Application::new("blog");

        let first = ember.init_app(&mut app).unwrap();
        let second = ember.init_app(&mut app).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(app.extensions().len(), 1);
        assert!(app.extensions().contains(EXTENSION_NAME));

        let registered = get_ember(&app).unwrap();
        assert!(Arc::ptr_eq(&registered, &first));
        assert!(registered.get("UserAccount").is_some());
    }

    #[test]
    fn test_failed_init_leaves_app_untouched() {
        let mut ember = Ember::default();
        ember
            .declare(
                ResourceDef::new("Post")
                    .relationship("author", Relationship::many_to_one("Author")),
            )
            .unwrap();
        let mut app = Application::new("blog");

        assert!(ember.init_app(&mut app).is_err());
        assert!(app.extensions().is_empty());
        assert_eq!(get_ember(&app).unwrap_err(), ResourceError::NotInitialized);
    }

    #[test]
    fn test_compiled_schema_renders_sql_and_json() {
        let mut ember = Ember::default();
        ember
            .declare(ResourceDef::new("UserAccount").field("email", Field::string(Some(255))))
            .unwrap();
        ember
            .declare(
                ResourceDef::new("Post")
                    .field("title", Field::text())
                    .relationship("author", Relationship::many_to_one("UserAccount")),
            )
            .unwrap();

        let schema = ember.compiled_schema().unwrap();
        let sql = schema.to_sql();
        assert!(sql.contains("CREATE TABLE user_account (\n    id INTEGER NOT NULL,"));
        assert!(sql.contains(
            "CONSTRAINT post_author_id_fk FOREIGN KEY (author_id) REFERENCES user_account (id) ON UPDATE CASCADE"
        ));
        assert!(sql.find("CREATE TABLE user_account") < sql.find("CREATE TABLE post"));

        let json: serde_json::Value = serde_json::from_str(&schema.to_json().unwrap()).unwrap();
        let models = json["models"].as_array().unwrap();
        assert_eq!(models.len(), 2);
        assert_eq!(models[1]["table"]["name"], "post");
        assert_eq!(models[1]["properties"][2]["kind"], "relation");
    }
}
