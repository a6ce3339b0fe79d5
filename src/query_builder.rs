// Copyright (c) 2025 ADBC Drivers Contributors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! SQL statements for introspection and administration.
//!
//! Caller-supplied names and values are only ever interpolated through
//! [`quote_identifier`] and [`quote_literal`]. Keywords come from the enums
//! in this module, never from caller text.

use crate::error::{Error, Result};
use crate::quote::{qualified, quote_identifier, quote_literal, Expr, SqlValue};
use indexmap::IndexMap;
use regex::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;

static OPTION_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("option name pattern is valid")
});

/// Privileges that can be granted or revoked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Privilege {
    All,
    Select,
    Insert,
    Update,
    Delete,
    Truncate,
    References,
    Usage,
    Ownership,
    Monitor,
    Operate,
    Modify,
    CreateSchema,
    CreateTable,
    CreateView,
    CreateStage,
}

impl Privilege {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::All => "ALL",
            Self::Select => "SELECT",
            Self::Insert => "INSERT",
            Self::Update => "UPDATE",
            Self::Delete => "DELETE",
            Self::Truncate => "TRUNCATE",
            Self::References => "REFERENCES",
            Self::Usage => "USAGE",
            Self::Ownership => "OWNERSHIP",
            Self::Monitor => "MONITOR",
            Self::Operate => "OPERATE",
            Self::Modify => "MODIFY",
            Self::CreateSchema => "CREATE SCHEMA",
            Self::CreateTable => "CREATE TABLE",
            Self::CreateView => "CREATE VIEW",
            Self::CreateStage => "CREATE STAGE",
        }
    }
}

/// Securable objects a privilege can be granted on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectType {
    Database,
    Schema,
    Warehouse,
    Table,
    Role,
    User,
}

impl ObjectType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Database => "DATABASE",
            Self::Schema => "SCHEMA",
            Self::Warehouse => "WAREHOUSE",
            Self::Table => "TABLE",
            Self::Role => "ROLE",
            Self::User => "USER",
        }
    }
}

/// Objects living inside a schema, used by `ON ALL <kind>S IN SCHEMA`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SchemaObjectKind {
    Table,
    View,
}

impl SchemaObjectKind {
    fn plural(self) -> &'static str {
        match self {
            Self::Table => "TABLES",
            Self::View => "VIEWS",
        }
    }
}

/// Principals that can receive grants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GranteeType {
    Role,
    User,
}

impl GranteeType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Role => "ROLE",
            Self::User => "USER",
        }
    }
}

/// Value of a user option: caller text, or a raw expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Setting {
    Text(String),
    Expr(Expr),
}

impl From<&str> for Setting {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for Setting {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<Expr> for Setting {
    fn from(value: Expr) -> Self {
        Self::Expr(value)
    }
}

impl<'a> From<&'a Setting> for SqlValue<'a> {
    fn from(value: &'a Setting) -> Self {
        match value {
            Setting::Text(text) => SqlValue::Text(text),
            Setting::Expr(expr) => SqlValue::Expr(expr.as_str()),
        }
    }
}

/// Ordered `NAME=value` options for `CREATE USER` / `ALTER USER`.
///
/// Rendering follows insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Options(IndexMap<String, Setting>);

impl Options {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an option, keeping its original position if it was already set.
    pub fn set(mut self, name: impl Into<String>, value: impl Into<Setting>) -> Self {
        self.0.insert(name.into(), value.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Setting)> {
        self.0.iter().map(|(name, value)| (name.as_str(), value))
    }
}

impl<K, V> FromIterator<(K, V)> for Options
where
    K: Into<String>,
    V: Into<Setting>,
{
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self(
            iter.into_iter()
                .map(|(name, value)| (name.into(), value.into()))
                .collect(),
        )
    }
}

/// Renders one `UPPERCASE_NAME=<quoted value>` line per option.
pub fn render_options(options: &Options) -> Result<String> {
    let mut lines = Vec::with_capacity(options.len());
    let mut seen = HashSet::with_capacity(options.len());
    for (name, value) in options.iter() {
        if !OPTION_NAME.is_match(name) {
            return Err(Error::adapter(format!("Invalid option name '{name}'")));
        }
        let keyword = name.to_uppercase();
        if !seen.insert(keyword.clone()) {
            return Err(Error::adapter(format!("Option {keyword} given more than once")));
        }
        lines.push(format!("{keyword}={}", quote_literal(value)));
    }
    Ok(lines.join("\n"))
}

fn privilege_list(privileges: &[Privilege]) -> Result<String> {
    if privileges.is_empty() {
        return Err(Error::adapter("At least one privilege must be specified"));
    }
    let names: Vec<&str> = privileges.iter().map(|p| p.as_str()).collect();
    Ok(names.join(","))
}

/// Builds introspection and administration statements.
#[derive(Debug, Clone, Copy, Default)]
pub struct QueryBuilder;

impl QueryBuilder {
    pub fn show_table_in_schema(schema: &str, table: &str) -> String {
        format!(
            "SHOW TABLES LIKE {} IN SCHEMA {}",
            quote_literal(table),
            quote_identifier(schema)
        )
    }

    pub fn show_columns(schema: &str, table: &str) -> String {
        format!("SHOW COLUMNS IN {}", qualified([schema, table]))
    }

    pub fn describe_table(schema: &str, table: &str) -> String {
        format!("DESC TABLE {}", qualified([schema, table]))
    }

    pub fn describe_user(user: &str) -> String {
        format!("DESCRIBE USER {}", quote_identifier(user))
    }

    pub fn create_role(role: &str) -> String {
        format!("CREATE ROLE IF NOT EXISTS {}", quote_identifier(role))
    }

    pub fn create_schema(schema: &str) -> String {
        format!("CREATE SCHEMA IF NOT EXISTS {}", quote_identifier(schema))
    }

    /// `CREATE USER IF NOT EXISTS`, with any extra options on their own lines.
    pub fn create_user<'a>(
        user: &str,
        password: impl Into<SqlValue<'a>>,
        options: &Options,
    ) -> Result<String> {
        let mut sql = format!(
            "CREATE USER IF NOT EXISTS {}\nPASSWORD = {}",
            quote_identifier(user),
            quote_literal(password)
        );
        if !options.is_empty() {
            sql.push('\n');
            sql.push_str(&render_options(options)?);
        }
        Ok(sql)
    }

    /// `ALTER USER IF EXISTS ... SET`; there must be at least one option.
    pub fn alter_user(user: &str, options: &Options) -> Result<String> {
        if options.is_empty() {
            return Err(Error::adapter(format!(
                "No options given to alter user {user}"
            )));
        }
        Ok(format!(
            "ALTER USER IF EXISTS {} SET\n{}",
            quote_identifier(user),
            render_options(options)?
        ))
    }

    pub fn show_roles(like: Option<&str>) -> String {
        match like {
            Some(pattern) => format!("SHOW ROLES LIKE {}", quote_literal(pattern)),
            None => "SHOW ROLES".to_string(),
        }
    }

    pub fn show_schemas(like: &str) -> String {
        format!("SHOW SCHEMAS LIKE {}", quote_literal(like))
    }

    /// `GRANT <privileges> ON <type> <name> TO <grantee type> <grantee>`.
    ///
    /// Pass a [`qualified`] name to grant on a schema-qualified table.
    pub fn grant_on_object<'a>(
        privileges: &[Privilege],
        on_type: ObjectType,
        on_name: impl Into<SqlValue<'a>>,
        grantee_type: GranteeType,
        grantee: &str,
    ) -> Result<String> {
        Ok(format!(
            "GRANT {} ON {} {} TO {} {}",
            privilege_list(privileges)?,
            on_type.as_str(),
            quote_identifier(on_name),
            grantee_type.as_str(),
            quote_identifier(grantee)
        ))
    }

    pub fn revoke_on_object<'a>(
        privileges: &[Privilege],
        on_type: ObjectType,
        on_name: impl Into<SqlValue<'a>>,
        grantee_type: GranteeType,
        grantee: &str,
    ) -> Result<String> {
        Ok(format!(
            "REVOKE {} ON {} {} FROM {} {}",
            privilege_list(privileges)?,
            on_type.as_str(),
            quote_identifier(on_name),
            grantee_type.as_str(),
            quote_identifier(grantee)
        ))
    }

    pub fn grant_on_all_in_schema(
        privileges: &[Privilege],
        kind: SchemaObjectKind,
        schema: &str,
        grantee_type: GranteeType,
        grantee: &str,
    ) -> Result<String> {
        Ok(format!(
            "GRANT {} ON ALL {} IN SCHEMA {} TO {} {}",
            privilege_list(privileges)?,
            kind.plural(),
            quote_identifier(schema),
            grantee_type.as_str(),
            quote_identifier(grantee)
        ))
    }

    pub fn grant_select_on_all_tables_in_schema_to_role(schema: &str, role: &str) -> String {
        format!(
            "GRANT SELECT ON ALL TABLES IN SCHEMA {} TO ROLE {}",
            quote_identifier(schema),
            quote_identifier(role)
        )
    }

    pub fn grant_role(role: &str, grantee_type: GranteeType, grantee: &str) -> String {
        format!(
            "GRANT ROLE {} TO {} {}",
            quote_identifier(role),
            grantee_type.as_str(),
            quote_identifier(grantee)
        )
    }

    pub fn revoke_role(role: &str, grantee_type: GranteeType, grantee: &str) -> String {
        format!(
            "REVOKE ROLE {} FROM {} {}",
            quote_identifier(role),
            grantee_type.as_str(),
            quote_identifier(grantee)
        )
    }

    pub fn show_grants_of_role(role: &str) -> String {
        format!("SHOW GRANTS OF ROLE {}", quote_identifier(role))
    }

    pub fn show_grants_to_role(role: &str) -> String {
        format!("SHOW GRANTS TO ROLE {}", quote_identifier(role))
    }

    pub fn show_grants_to_user(user: &str) -> String {
        format!("SHOW GRANTS TO USER {}", quote_identifier(user))
    }

    pub fn current_role() -> String {
        r#"SELECT CURRENT_ROLE() AS "name""#.to_string()
    }

    /// Tags every following query of the session with `{"runId": <run_id>}`.
    pub fn set_query_tag(run_id: &str) -> String {
        let tag = serde_json::json!({ "runId": run_id }).to_string();
        format!("ALTER SESSION SET QUERY_TAG={}", quote_literal(&tag))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_describe_table() {
        assert_eq!(
            QueryBuilder::describe_table("schema\"na'me", "table\"na'me"),
            r#"DESC TABLE "schema""na'me"."table""na'me""#
        );
    }

    #[test]
    fn test_show_table_in_schema() {
        assert_eq!(
            QueryBuilder::show_table_in_schema("schema\"na'me", "table\"na'me"),
            r#"SHOW TABLES LIKE 'table\"na\'me' IN SCHEMA "schema""na'me""#
        );
    }

    #[test]
    fn test_show_columns() {
        assert_eq!(
            QueryBuilder::show_columns("schema\"na'me", "table\"na'me"),
            r#"SHOW COLUMNS IN "schema""na'me"."table""na'me""#
        );
    }

    #[test]
    fn test_render_options_keeps_insertion_order() {
        let options = Options::new()
            .set("zeta", "last-alphabetically")
            .set("alpha", "o'brien")
            .set("mid", Expr::new("CURRENT_TIMESTAMP()"));
        assert_eq!(
            render_options(&options).unwrap(),
            "ZETA='last-alphabetically'\nALPHA='o\\'brien'\nMID=CURRENT_TIMESTAMP()"
        );
    }

    #[test]
    fn test_render_options_rejects_bad_names() {
        let options = Options::new().set("x=1 -- ", "v");
        assert!(render_options(&options).is_err());
    }

    #[test]
    fn test_render_options_rejects_case_duplicates() {
        let options = Options::new()
            .set("default_role", "A")
            .set("DEFAULT_ROLE", "B");
        let err = render_options(&options).unwrap_err();
        assert_eq!(err.to_string(), "Option DEFAULT_ROLE given more than once");
        assert!(QueryBuilder::alter_user("joe", &options).is_err());
    }

    #[test]
    fn test_alter_user() {
        let options: Options = [("default_role", "ANALYST"), ("display_name", "Jo")]
            .into_iter()
            .collect();
        assert_eq!(
            QueryBuilder::alter_user("jo\"e", &options).unwrap(),
            "ALTER USER IF EXISTS \"jo\"\"e\" SET\nDEFAULT_ROLE='ANALYST'\nDISPLAY_NAME='Jo'"
        );
    }

    #[test]
    fn test_alter_user_requires_options() {
        let err = QueryBuilder::alter_user("joe", &Options::new()).unwrap_err();
        assert!(err.to_string().contains("joe"));
    }

    #[test]
    fn test_create_user() {
        let sql = QueryBuilder::create_user("joe", "pa'ss", &Options::new()).unwrap();
        assert_eq!(sql, "CREATE USER IF NOT EXISTS \"joe\"\nPASSWORD = 'pa\\'ss'");

        let options = Options::new().set("must_change_password", Expr::new("TRUE"));
        let sql = QueryBuilder::create_user("joe", "x", &options).unwrap();
        assert!(sql.ends_with("\nMUST_CHANGE_PASSWORD=TRUE"));
    }

    #[test]
    fn test_show_roles() {
        assert_eq!(QueryBuilder::show_roles(None), "SHOW ROLES");
        assert_eq!(
            QueryBuilder::show_roles(Some("ADMIN_%")),
            "SHOW ROLES LIKE 'ADMIN_%'"
        );
        assert_eq!(
            QueryBuilder::show_schemas("in.c-%"),
            "SHOW SCHEMAS LIKE 'in.c-%'"
        );
    }

    #[test]
    fn test_grant_on_object() {
        let sql = QueryBuilder::grant_on_object(
            &[Privilege::Usage, Privilege::Monitor],
            ObjectType::Warehouse,
            "DEV_WH",
            GranteeType::Role,
            "analyst",
        )
        .unwrap();
        assert_eq!(sql, r#"GRANT USAGE,MONITOR ON WAREHOUSE "DEV_WH" TO ROLE "analyst""#);

        let table = qualified(["in.c-main", "orders"]);
        let sql = QueryBuilder::revoke_on_object(
            &[Privilege::Select],
            ObjectType::Table,
            &table,
            GranteeType::User,
            "joe",
        )
        .unwrap();
        assert_eq!(
            sql,
            r#"REVOKE SELECT ON TABLE "in.c-main"."orders" FROM USER "joe""#
        );
    }

    #[test]
    fn test_grant_requires_privileges() {
        let result = QueryBuilder::grant_on_object(
            &[],
            ObjectType::Schema,
            "s",
            GranteeType::Role,
            "r",
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_grant_on_all_in_schema() {
        let sql = QueryBuilder::grant_on_all_in_schema(
            &[Privilege::Select, Privilege::Insert],
            SchemaObjectKind::Table,
            "sch",
            GranteeType::Role,
            "r",
        )
        .unwrap();
        assert_eq!(
            sql,
            r#"GRANT SELECT,INSERT ON ALL TABLES IN SCHEMA "sch" TO ROLE "r""#
        );
        assert_eq!(
            QueryBuilder::grant_select_on_all_tables_in_schema_to_role("sch", "r"),
            r#"GRANT SELECT ON ALL TABLES IN SCHEMA "sch" TO ROLE "r""#
        );
    }

    #[test]
    fn test_role_grants() {
        assert_eq!(
            QueryBuilder::grant_role("reader", GranteeType::User, "joe"),
            r#"GRANT ROLE "reader" TO USER "joe""#
        );
        assert_eq!(
            QueryBuilder::revoke_role("reader", GranteeType::Role, "writer"),
            r#"REVOKE ROLE "reader" FROM ROLE "writer""#
        );
        assert_eq!(
            QueryBuilder::show_grants_of_role("reader"),
            r#"SHOW GRANTS OF ROLE "reader""#
        );
        assert_eq!(
            QueryBuilder::show_grants_to_role("reader"),
            r#"SHOW GRANTS TO ROLE "reader""#
        );
    }

    #[test]
    fn test_set_query_tag() {
        assert_eq!(
            QueryBuilder::set_query_tag("run-1"),
            r#"ALTER SESSION SET QUERY_TAG='{\"runId\":\"run-1\"}'"#
        );
    }

    #[test]
    fn test_set_query_tag_escapes_json_and_literal() {
        // JSON escapes `"` and `\`, then the literal escapes every quote and backslash again.
        assert_eq!(
            QueryBuilder::set_query_tag(r#"a"b'c\d"#),
            r#"ALTER SESSION SET QUERY_TAG='{\"runId\":\"a\\\"b\'c\\\\d\"}'"#
        );
    }
}
