//! Loading resource declarations from YAML files
//!
//! Covers file loading, declaration order and end-to-end compilation
//! of a small blog schema.

#[cfg(test)]
mod declarations_tests {
    use std::io::Write;

    use ember::ember::{get_ember, Application, Ember};
    use ember::resource::{ResourceError, ResourceSchemaConfig};

    const BLOG_YAML: &str = r#"
name: blog
resources:
  - name: Post
    extends: Entry
    fields:
      - name: title
        type: string
        length: 200
        nullable: false
    relationships:
      - name: author
        kind: many_to_one
        target: UserAccount
        inverse: posts
  - name: Entry
    abstract: true
    doc: Shared timestamp columns
    fields:
      - name: created_at
        type: datetime
  - name: UserAccount
    tablename: users
    fields:
      - name: email
        type: string
        length: 255
        unique: true
    relationships:
      - name: posts
        kind: one_to_many
        target: Post
        inverse: author
"#;

    fn write_temp(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_load_declare_and_compile() {
        let file = write_temp(BLOG_YAML);
        let config = ResourceSchemaConfig::from_yaml_file(file.path()).unwrap();

        let mut ember = Ember::default();
        let declared = config.declare_into(&mut ember).unwrap();
        let names: Vec<&str> = declared.iter().map(|r| r.name()).collect();
        assert_eq!(names, vec!["Entry", "UserAccount", "Post"]);

        let mut app = Application::new("blog");
        ember.init_app(&mut app).unwrap();
        let schema = get_ember(&app).unwrap();
        assert_eq!(schema.len(), 3);
        assert!(schema.get("Entry").unwrap().is_abstract);

        let sql = schema.to_sql();
        assert!(sql.contains("CREATE TABLE users ("));
        assert!(sql.contains("email VARCHAR(255) UNIQUE"));
        assert!(sql.contains("title VARCHAR(200) NOT NULL"));
        assert!(sql.contains("REFERENCES users (id) ON UPDATE CASCADE"));
        assert!(!sql.contains("CREATE TABLE entry"));

        let post = schema.get("Post").unwrap();
        let columns: Vec<&str> = post.columns().iter().map(|c| c.name.as_str()).collect();
        assert_eq!(columns, vec!["id", "created_at", "title", "author_id"]);
    }

    #[test]
    fn test_invalid_declarations_fail_before_declaring() {
        let file = write_temp(
            r#"
resources:
  - name: Post
    extends: Missing
"#,
        );
        let config = ResourceSchemaConfig::from_yaml_file(file.path()).unwrap();
        let mut ember = Ember::default();
        let err = config.declare_into(&mut ember).unwrap_err();
        assert!(matches!(err, ResourceError::InvalidConfig { .. }));
        assert!(ember.resources().is_empty());
    }

    #[test]
    fn test_unknown_generator_in_file() {
        let config = ResourceSchemaConfig::from_yaml_str(
            r#"
resources:
  - name: Post
    tablename_generator: pluralize
"#,
        )
        .unwrap();
        assert_eq!(
            config.validate().unwrap_err(),
            ResourceError::UnknownTableNameGenerator {
                name: "pluralize".to_string()
            }
        );
    }
}
