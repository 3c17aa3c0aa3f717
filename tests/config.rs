#[cfg(test)]
mod tests {
    use nounou::api::rest::RestConfig;
    use nounou::libs::config::{Config, StoreConfig};
    use nounou::store::{Addressing, Backend};
    use serde_json::json;
    use std::path::PathBuf;
    use tempfile::TempDir;
    use test_context::{test_context, TestContext};

    struct ConfigTestContext {
        temp_dir: TempDir,
        api_url: String,
        api_key: String,
    }

    impl ConfigTestContext {
        fn config_path(&self) -> PathBuf {
            self.temp_dir.path().join("nounou").join("config.json")
        }
    }

    impl TestContext for ConfigTestContext {
        fn setup() -> Self {
            ConfigTestContext {
                temp_dir: tempfile::tempdir().unwrap(),
                api_url: "https://project.supabase.co".to_string(),
                api_key: "anon-key".to_string(),
            }
        }
    }

    #[test_context(ConfigTestContext)]
    #[test]
    fn test_default_config(_ctx: &mut ConfigTestContext) {
        let config = Config::default();
        assert_eq!(config.store, StoreConfig::Sqlite { path: None });
        assert_eq!(config.addressing, Addressing::Shared);
        assert!(config.default_child.is_none());
        assert!(config.user_id.is_none());
    }

    #[test_context(ConfigTestContext)]
    #[test]
    fn test_read_nonexistent_config(ctx: &mut ConfigTestContext) {
        let config = Config::read_from(&ctx.config_path()).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test_context(ConfigTestContext)]
    #[test]
    fn test_save_and_read_config(ctx: &mut ConfigTestContext) {
        let config = Config {
            store: StoreConfig::Rest(RestConfig {
                api_url: ctx.api_url.clone(),
                api_key: ctx.api_key.clone(),
            }),
            addressing: Addressing::PerChild,
            default_child: Some("caly".to_string()),
            user_id: None,
        };

        config.save_to(&ctx.config_path()).unwrap();
        let read_back = Config::read_from(&ctx.config_path()).unwrap();
        assert_eq!(read_back, config);

        let raw: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(ctx.config_path()).unwrap()).unwrap();
        assert_eq!(raw["store"]["backend"], json!("rest"));
        assert_eq!(raw["addressing"], json!("per_child"));
        assert!(raw.get("user_id").is_none());
    }

    #[test_context(ConfigTestContext)]
    #[test]
    fn test_partial_config_file(ctx: &mut ConfigTestContext) {
        std::fs::create_dir_all(ctx.config_path().parent().unwrap()).unwrap();
        std::fs::write(ctx.config_path(), r#"{"default_child": "nate"}"#).unwrap();

        let config = Config::read_from(&ctx.config_path()).unwrap();
        assert_eq!(config.default_child.as_deref(), Some("nate"));
        assert_eq!(config.store, StoreConfig::default());
    }

    #[test_context(ConfigTestContext)]
    #[test]
    fn test_invalid_config_file(ctx: &mut ConfigTestContext) {
        std::fs::create_dir_all(ctx.config_path().parent().unwrap()).unwrap();
        std::fs::write(ctx.config_path(), r#"{"addressing": "sharded"}"#).unwrap();

        assert!(Config::read_from(&ctx.config_path()).is_err());
    }

    #[test_context(ConfigTestContext)]
    #[test]
    fn test_environment_overrides(ctx: &mut ConfigTestContext) {
        let mut config = Config::default();

        config.apply_overrides(Some(ctx.api_url.clone()), None);
        assert_eq!(config.store, StoreConfig::default());

        config.apply_overrides(Some(ctx.api_url.clone()), Some("  ".to_string()));
        assert_eq!(config.store, StoreConfig::default());

        config.apply_overrides(Some(ctx.api_url.clone()), Some(ctx.api_key.clone()));
        assert_eq!(
            config.store,
            StoreConfig::Rest(RestConfig {
                api_url: ctx.api_url.clone(),
                api_key: ctx.api_key.clone(),
            })
        );
    }

    #[test_context(ConfigTestContext)]
    #[test]
    fn test_masked_config_hides_api_key(ctx: &mut ConfigTestContext) {
        let mut config = Config::default();
        config.apply_overrides(Some(ctx.api_url.clone()), Some("eyJhbGciOiJIUzI1NiJ9.secret.k3Yq".to_string()));

        let masked = config.masked();
        match &masked.store {
            StoreConfig::Rest(rest) => {
                assert_eq!(rest.api_key, "****k3Yq");
                assert_eq!(rest.api_url, ctx.api_url);
            }
            other => panic!("unexpected store {:?}", other),
        }
        let printed = serde_json::to_string_pretty(&masked).unwrap();
        assert!(!printed.contains("secret"));

        config.apply_overrides(Some(ctx.api_url.clone()), Some(ctx.api_key.clone()));
        assert!(matches!(config.masked().store, StoreConfig::Rest(ref rest) if rest.api_key == "****"));
        assert_eq!(Config::default().masked(), Config::default());
    }

    #[test_context(ConfigTestContext)]
    #[test]
    fn test_open_backend(ctx: &mut ConfigTestContext) {
        let local = Config {
            store: StoreConfig::Sqlite {
                path: Some(ctx.temp_dir.path().join("local.db")),
            },
            ..Config::default()
        };
        assert!(matches!(local.open_backend().unwrap(), Backend::Sqlite(_)));
        assert!(ctx.temp_dir.path().join("local.db").exists());

        let mut hosted = Config::default();
        hosted.apply_overrides(Some(ctx.api_url.clone()), Some(ctx.api_key.clone()));
        assert!(matches!(hosted.open_backend().unwrap(), Backend::Rest(_)));
    }
}
