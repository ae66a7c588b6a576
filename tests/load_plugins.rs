use anyhow::Result;
use plugload::{
    load_plugins, load_plugins_in, LoadError, LoadOptions, Loader as _, ManifestSource,
    MemorySink, ModuleInfo, ProjectContext, Registry,
};
use serde_json::{json, Value};
use std::{cell::RefCell, fs, rc::Rc};
use tempfile::TempDir;

fn stub_registry() -> Registry<Value> {
    Registry::new()
        .register("gulp-foo", || json!({ "name": "foo" }))
        .register("gulp-bar", || json!({ "name": "bar" }))
        .register("gulp-foo-bar", || json!({ "name": "foo-bar" }))
        .register("gulp.baz", || json!({ "name": "baz" }))
        .register("gulp-insert", || {
            json!({ "wrap": "insert.wrap", "append": "insert.append" })
        })
        .register("jack-foo", || json!({ "name": "jack-foo" }))
        .register("@myco/gulp-test-plugin", || json!({ "name": "test-plugin" }))
        .register("bar", || json!({ "name": "plain-bar" }))
        .register("@foo/gulp-bar", || json!({ "name": "scoped-bar" }))
}

fn options(deps: Value) -> LoadOptions<Value> {
    LoadOptions::with_loader(stub_registry()).manifest_value(json!({ "dependencies": deps }))
}

/// Loader that records every name it is asked for.
fn counting_options(deps: Value, calls: Rc<RefCell<Vec<String>>>) -> LoadOptions<Value> {
    let registry = stub_registry();
    LoadOptions::with_loader(move |name: &str| -> plugload::Result<Value> {
        calls.borrow_mut().push(name.to_string());
        registry.load(name, std::path::Path::new("."))
    })
    .manifest_value(json!({ "dependencies": deps }))
}

#[test]
fn missing_manifest_is_a_configuration_error() {
    let err = load_plugins(LoadOptions::with_loader(stub_registry()).manifest(ManifestSource::Missing))
        .unwrap_err();
    assert!(matches!(err, LoadError::ConfigNotFound));
    assert_eq!(
        err.to_string(),
        "Could not find dependencies. Do you have a package.json file in your project?"
    );

    let err = load_plugins(LoadOptions::with_loader(stub_registry()).manifest_value(Value::Null))
        .unwrap_err();
    assert!(matches!(err, LoadError::ConfigNotFound));
}

#[test]
fn default_config_exposes_matching_plugins() -> Result<()> {
    let plugins = load_plugins(options(json!({
        "gulp-foo": "1.0.0",
        "gulp-bar": "*",
        "gulp-insert": "*",
        "gulp.baz": "*"
    })))?;

    assert_eq!(plugins.get("foo")?["name"], "foo");
    assert_eq!(plugins.get("bar")?["name"], "bar");
    assert_eq!(plugins.get("baz")?["name"], "baz");
    assert_eq!(plugins.get("insert")?["wrap"], "insert.wrap");
    assert_eq!(plugins.get("insert")?["append"], "insert.append");
    assert_eq!(plugins.len(), 4);
    Ok(())
}

#[test]
fn explicit_pattern_replaces_defaults() -> Result<()> {
    let plugins = load_plugins(
        options(json!({ "jack-foo": "1.0.0", "gulp-bar": "*" }))
            .pattern("jack-*")
            .replace_string("jack-"),
    )?;

    assert_eq!(plugins.get("foo")?["name"], "jack-foo");
    assert!(!plugins.contains_key("bar"));
    Ok(())
}

#[test]
fn extending_pattern_keeps_defaults() -> Result<()> {
    let plugins = load_plugins(
        options(json!({ "jack-foo": "1.0.0", "gulp-bar": "*" }))
            .pattern("jack-*")
            .override_pattern(false),
    )?;

    assert_eq!(plugins.get("jackFoo")?["name"], "jack-foo");
    assert_eq!(plugins.get("bar")?["name"], "bar");
    Ok(())
}

#[test]
fn camelize_toggle() -> Result<()> {
    let raw = load_plugins(options(json!({ "gulp-foo-bar": "*" })).camelize(false))?;
    assert!(raw.contains_key("foo-bar"));
    assert!(!raw.contains_key("fooBar"));

    let camel = load_plugins(options(json!({ "gulp-foo-bar": "*" })))?;
    assert_eq!(camel.get("fooBar")?["name"], "foo-bar");
    Ok(())
}

#[test]
fn rename_table_maps_key_to_original_module() -> Result<()> {
    let plugins = load_plugins(options(json!({ "gulp-foo": "*" })).rename("gulp-foo", "bar"))?;
    assert_eq!(plugins.get("bar")?["name"], "foo");
    assert!(!plugins.contains_key("foo"));
    Ok(())
}

#[test]
fn rename_fn_fully_overrides_naming() -> Result<()> {
    let plugins = load_plugins(options(json!({ "gulp-foo-bar": "*" })).rename_fn(|_| "baz".to_string()))?;
    assert_eq!(plugins.keys(), vec!["baz"]);
    assert_eq!(plugins.get("baz")?["name"], "foo-bar");
    Ok(())
}

#[test]
fn scoped_plugins_nest_or_flatten() -> Result<()> {
    let nested = load_plugins(options(json!({ "@myco/gulp-test-plugin": "1" })))?;
    assert_eq!(nested.scoped("myco", "testPlugin")?["name"], "test-plugin");
    assert_eq!(nested.lookup("myco.testPlugin")?["name"], "test-plugin");
    assert!(!nested.contains_key("testPlugin"));

    let flat = load_plugins(options(json!({ "@myco/gulp-test-plugin": "1" })).maintain_scope(false))?;
    assert_eq!(flat.get("testPlugin")?["name"], "test-plugin");
    assert!(flat.scope("myco").is_none());
    Ok(())
}

#[test]
fn lazy_loading_waits_for_first_read() -> Result<()> {
    let calls = Rc::new(RefCell::new(Vec::new()));
    let plugins = load_plugins(counting_options(
        json!({ "gulp-foo": "*", "gulp-bar": "*" }),
        calls.clone(),
    ))?;
    assert!(calls.borrow().is_empty());

    plugins.get("foo")?;
    plugins.get("foo")?;
    assert_eq!(calls.borrow().as_slice(), ["gulp-foo"]);
    assert!(!plugins.plugin("bar").map(|p| p.is_loaded()).unwrap_or(true));
    Ok(())
}

#[test]
fn eager_loading_happens_during_the_call() -> Result<()> {
    let calls = Rc::new(RefCell::new(Vec::new()));
    let plugins = load_plugins(
        counting_options(json!({ "gulp-foo": "*", "gulp-bar": "*" }), calls.clone()).lazy(false),
    )?;
    assert_eq!(calls.borrow().len(), 2);

    plugins.get("foo")?;
    assert_eq!(calls.borrow().len(), 2);
    Ok(())
}

#[test]
fn post_require_transform_replaces_value() -> Result<()> {
    let plugins = load_plugins(
        options(json!({ "gulp-foo": "*", "gulp-bar": "*" }))
            .post_require_transform("foo", |_| json!("transformed")),
    )?;
    assert_eq!(plugins.get("foo")?, &json!("transformed"));
    assert_eq!(plugins.get("bar")?["name"], "bar");
    Ok(())
}

#[test]
fn unloadable_and_undeclared_keys_fail_on_access() -> Result<()> {
    let plugins = load_plugins(options(json!({
        "gulp-foo": "*",
        "gulp-a-plugin-that-does-not-exist": "*"
    })))?;

    let err = plugins.get("aPluginThatDoesNotExist").unwrap_err();
    assert_eq!(
        err.to_string(),
        "Cannot find module 'gulp-a-plugin-that-does-not-exist'"
    );
    // The rest of the object is unaffected.
    assert_eq!(plugins.get("foo")?["name"], "foo");

    let err = plugins.get("undeclared").unwrap_err();
    assert!(matches!(err, LoadError::UnknownKey { .. }));
    Ok(())
}

#[test]
fn eager_missing_module_fails_the_call() {
    let err = load_plugins(options(json!({ "gulp-nope": "*" })).lazy(false)).unwrap_err();
    assert_eq!(err.to_string(), "Cannot find module 'gulp-nope'");
}

#[test]
fn colliding_names_abort_before_loading() {
    let calls = Rc::new(RefCell::new(Vec::new()));
    let err = load_plugins(
        counting_options(json!({ "bar": "*", "gulp-bar": "*" }), calls.clone())
            .pattern("*")
            .lazy(false),
    )
    .unwrap_err();

    let msg = err.to_string();
    assert!(msg.contains("\"bar\""));
    assert!(msg.contains("gulp-bar"));
    assert!(msg.contains("repeated dependencies"));
    assert!(calls.borrow().is_empty());
}

#[test]
fn cross_scope_collision_when_flattened() {
    let err = load_plugins(
        options(json!({ "@foo/gulp-bar": "*", "gulp-bar": "*" })).maintain_scope(false),
    )
    .unwrap_err();
    assert!(matches!(err, LoadError::Collision { cross_scope: true, .. }));
    assert!(err.to_string().contains("another scope"));

    assert!(load_plugins(options(json!({ "@foo/gulp-bar": "*", "gulp-bar": "*" }))).is_ok());
}

#[test]
fn rename_entry_leaves_scoped_namesake_alone() -> Result<()> {
    let plugins = load_plugins(
        LoadOptions::with_loader(
            stub_registry().register("@x/gulp-foo", || json!({ "name": "scoped-foo" })),
        )
        .manifest_value(json!({ "dependencies": { "gulp-foo": "*", "@x/gulp-foo": "*" } }))
        .rename("gulp-foo", "bar")
        .maintain_scope(false),
    )?;

    assert_eq!(plugins.keys(), vec!["bar", "foo"]);
    assert_eq!(plugins.get("bar")?["name"], "foo");
    assert_eq!(plugins.get("foo")?["name"], "scoped-foo");
    Ok(())
}

#[test]
fn camelized_keys_start_lowercase() -> Result<()> {
    let plugins = load_plugins(
        LoadOptions::with_loader(
            stub_registry().register("gulp-Foo-bar", || json!({ "name": "Foo-bar" })),
        )
        .manifest_value(json!({ "dependencies": { "gulp-Foo-bar": "*" } })),
    )?;

    assert_eq!(plugins.keys(), vec!["fooBar"]);
    assert_eq!(plugins.get("fooBar")?["name"], "Foo-bar");
    Ok(())
}

#[test]
fn debug_lines_name_each_loaded_package() -> Result<()> {
    let sink = MemorySink::new();
    let plugins = load_plugins(
        options(json!({ "gulp-foo": "*", "gulp-bar": "*" }))
            .debug(true)
            .debug_sink(sink.clone()),
    )?;
    assert!(sink.lines().is_empty());

    plugins.get("bar")?;
    assert_eq!(sink.lines(), vec!["plugload: loading gulp-bar"]);

    let quiet = MemorySink::new();
    let plugins = load_plugins(options(json!({ "gulp-foo": "*" })).debug_sink(quiet.clone()))?;
    plugins.get("foo")?;
    assert!(quiet.lines().is_empty());
    Ok(())
}

#[test]
fn scans_only_configured_sections() -> Result<()> {
    let manifest = json!({
        "dependencies": { "gulp-foo": "*" },
        "devDependencies": { "gulp-bar": "*" },
        "optionalDependencies": { "gulp.baz": "*" }
    });

    let plugins = load_plugins(LoadOptions::with_loader(stub_registry()).manifest_value(manifest.clone()))?;
    assert_eq!(plugins.keys(), vec!["bar", "foo"]);

    let plugins = load_plugins(
        LoadOptions::with_loader(stub_registry())
            .manifest_value(manifest)
            .scope(["optionalDependencies"]),
    )?;
    assert_eq!(plugins.keys(), vec!["baz"]);
    Ok(())
}

fn write_project(root: &TempDir) -> Result<()> {
    fs::write(
        root.path().join("package.json"),
        r#"{
  "name": "site",
  "devDependencies": {
    "gulp-load-plugins": "^2.0.0",
    "gulp-sass": "^5.0.0",
    "@myco/gulp-lint": "1.0.0",
    "lodash": "^4.0.0"
  }
}"#,
    )?;
    for (name, version) in [
        ("gulp-load-plugins", "2.0.8"),
        ("gulp-sass", "5.1.0"),
        ("@myco/gulp-lint", "1.0.0"),
    ] {
        let dir = root.path().join("node_modules").join(name);
        fs::create_dir_all(&dir)?;
        fs::write(
            dir.join("package.json"),
            format!(r#"{{ "name": "{name}", "version": "{version}" }}"#),
        )?;
    }
    Ok(())
}

#[test]
fn default_loader_resolves_from_node_modules() -> Result<()> {
    let root = TempDir::new()?;
    write_project(&root)?;
    let ctx = ProjectContext::with_cwd(root.path().join("gulp"));

    let plugins = load_plugins_in(
        &ctx,
        LoadOptions::new().manifest_path(root.path().join("package.json")),
    )?;

    assert_eq!(plugins.keys(), vec!["myco.lint", "sass"]);
    let sass: &ModuleInfo = plugins.get("sass")?;
    assert_eq!(sass.version.as_deref(), Some("5.1.0"));
    assert_eq!(sass.dir, root.path().join("node_modules").join("gulp-sass"));
    assert_eq!(plugins.lookup("myco.lint")?.name, "@myco/gulp-lint");
    Ok(())
}

#[test]
fn discovery_walks_up_from_working_directory() -> Result<()> {
    let root = TempDir::new()?;
    write_project(&root)?;
    let nested = root.path().join("tasks").join("styles");
    fs::create_dir_all(&nested)?;

    let plugins = load_plugins_in(&ProjectContext::with_cwd(&nested), LoadOptions::new().lazy(false))?;
    assert!(plugins.plugin("sass").map(|p| p.is_loaded()).unwrap_or(false));
    Ok(())
}
