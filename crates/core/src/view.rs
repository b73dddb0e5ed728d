//! The view configuration resolver: merges settings, permissions, and the
//! dynamic field set into one effective table view descriptor.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::dynamic::DynamicFieldSpec;
use crate::entity::{dynamic_field_key, FieldDef};
use crate::predicate::{filters_to_predicate, EffectiveFilter, Predicate, SortSpec};
use crate::settings::{
    merge_sorts, order_columns, FilterRule, SettingSlot, SortRule, ViewRule,
};

/// The four merged setting kinds for one (user, entity) pair, keyed by
/// column.
#[derive(Debug, Default)]
pub struct ViewSettings {
    pub view: BTreeMap<String, SettingSlot<ViewRule>>,
    pub ordering: BTreeMap<String, SettingSlot<i32>>,
    pub sort: BTreeMap<String, SettingSlot<SortRule>>,
    pub filter: BTreeMap<String, SettingSlot<FilterRule>>,
}

/// One column of the resolved view.
#[derive(Debug, Clone, Serialize)]
pub struct EffectiveColumn {
    pub key: String,
    pub title: String,
    pub hidden: bool,
    pub width: Option<i32>,
    pub ordering: i32,
    pub sort: Option<SortRule>,
    pub filter: Option<FilterRule>,
}

/// The resolved view: what a listing endpoint needs to render and query.
#[derive(Debug, Serialize)]
pub struct TableView {
    pub columns: Vec<EffectiveColumn>,
    pub predicate: Option<Predicate>,
    pub sort: Vec<SortSpec>,
}

/// Resolve the effective view for one (user, entity) pair.
///
/// `read_rights` is the permission engine's read map over the combined
/// static + dynamic field set; columns the user cannot read are dropped
/// entirely, along with their sort and filter rules.
pub fn resolve_view(
    static_fields: &[FieldDef],
    dynamic_fields: &[DynamicFieldSpec],
    read_rights: &BTreeMap<String, bool>,
    settings: &ViewSettings,
) -> TableView {
    // Definition order: listable static fields, then dynamic fields in
    // declaration (id) order.
    let mut titles: BTreeMap<String, String> = BTreeMap::new();
    let mut definition_order: Vec<String> = Vec::new();

    for def in static_fields.iter().filter(|d| d.show_in_table) {
        definition_order.push(def.name.clone());
        titles.insert(def.name.clone(), def.title.clone());
    }
    for field in dynamic_fields {
        let key = dynamic_field_key(field.id);
        definition_order.push(key.clone());
        titles.insert(key, field.title.clone());
    }

    // Drop unreadable columns before anything else; their settings rows
    // must not leak through sort or filter either.
    definition_order.retain(|key| read_rights.get(key).copied().unwrap_or(false));

    let explicit_ordering: BTreeMap<String, i32> = settings
        .ordering
        .iter()
        .filter_map(|(col, slot)| slot.resolve().map(|n| (col.clone(), *n)))
        .collect();

    let columns: Vec<EffectiveColumn> = order_columns(&definition_order, &explicit_ordering)
        .into_iter()
        .map(|(key, ordering)| {
            let view_rule = settings.view.get(&key).and_then(|s| s.resolve());
            EffectiveColumn {
                title: titles.get(&key).cloned().unwrap_or_else(|| key.clone()),
                hidden: view_rule.map(|r| r.hidden).unwrap_or(false),
                width: view_rule.and_then(|r| r.width),
                ordering,
                sort: settings.sort.get(&key).and_then(|s| s.resolve()).cloned(),
                filter: settings.filter.get(&key).and_then(|s| s.resolve()).cloned(),
                key,
            }
        })
        .collect();

    let sort = merge_sorts(&settings.sort)
        .into_iter()
        .filter(|s| definition_order.contains(&s.column))
        .collect();

    let filters: Vec<EffectiveFilter> = columns
        .iter()
        .filter_map(|col| {
            col.filter.as_ref().map(|rule| EffectiveFilter {
                column: col.key.clone(),
                operator: rule.operator,
                value: rule.value.clone(),
            })
        })
        .collect();
    let predicate = filters_to_predicate(&filters, dynamic_fields);

    TableView {
        columns,
        predicate,
        sort,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dynamic::FieldType;
    use crate::predicate::{FilterOp, SortDirection};
    use crate::settings::{merge_by_column, SettingRow};
    use serde_json::json;

    fn fields() -> Vec<FieldDef> {
        crate::entity::Entity::Project.static_fields()
    }

    fn rights_all(static_fields: &[FieldDef], except: &[&str]) -> BTreeMap<String, bool> {
        static_fields
            .iter()
            .map(|d| (d.name.clone(), !except.contains(&d.name.as_str())))
            .collect()
    }

    fn row<T>(column: &str, personal: bool, rule: T) -> SettingRow<T> {
        SettingRow {
            column: column.into(),
            personal,
            rule,
        }
    }

    #[test]
    fn test_personal_hide_beats_global_show() {
        let static_fields = fields();
        let rights = rights_all(&static_fields, &[]);
        let settings = ViewSettings {
            view: merge_by_column(vec![
                row("budget", false, ViewRule { hidden: false, width: None }),
                row("budget", true, ViewRule { hidden: true, width: None }),
            ]),
            ..Default::default()
        };

        let view = resolve_view(&static_fields, &[], &rights, &settings);
        let budget = view.columns.iter().find(|c| c.key == "budget").unwrap();
        assert!(budget.hidden);
    }

    #[test]
    fn test_unreadable_column_dropped_with_its_rules() {
        let static_fields = fields();
        let rights = rights_all(&static_fields, &["salary"]);
        let settings = ViewSettings {
            filter: merge_by_column(vec![row(
                "salary",
                true,
                FilterRule {
                    operator: FilterOp::Gte,
                    value: json!(100),
                },
            )]),
            sort: merge_by_column(vec![row(
                "salary",
                true,
                SortRule {
                    direction: SortDirection::Desc,
                    priority: 1,
                },
            )]),
            ..Default::default()
        };

        let view = resolve_view(&static_fields, &[], &rights, &settings);
        assert!(view.columns.iter().all(|c| c.key != "salary"));
        assert!(view.sort.is_empty());
        assert_eq!(view.predicate, None);
    }

    #[test]
    fn test_explicit_ordering_then_definition_order() {
        let static_fields = fields();
        let rights = rights_all(&static_fields, &[]);
        let settings = ViewSettings {
            ordering: merge_by_column(vec![
                row("start_date", true, 1),
                row("name", true, 5),
            ]),
            ..Default::default()
        };

        let view = resolve_view(&static_fields, &[], &rights, &settings);
        assert_eq!(view.columns[0].key, "start_date");
        assert_eq!(view.columns[1].key, "name");
        // The rest keep definition order and continue numbering after 5.
        assert_eq!(view.columns[2].key, "code");
        assert_eq!(view.columns[2].ordering, 6);
    }

    #[test]
    fn test_dynamic_columns_appended_and_filterable() {
        let static_fields = fields();
        let dynamic = vec![DynamicFieldSpec {
            id: 3,
            title: "Complexity".into(),
            field_type: FieldType::Int,
            required: false,
            multiple: false,
        }];
        let mut rights = rights_all(&static_fields, &[]);
        rights.insert("dyn_3".into(), true);

        let settings = ViewSettings {
            filter: merge_by_column(vec![row(
                "dyn_3",
                false,
                FilterRule {
                    operator: FilterOp::Gt,
                    value: json!(2),
                },
            )]),
            ..Default::default()
        };

        let view = resolve_view(&static_fields, &dynamic, &rights, &settings);
        let col = view.columns.iter().find(|c| c.key == "dyn_3").unwrap();
        assert_eq!(col.title, "Complexity");
        assert!(matches!(
            view.predicate,
            Some(Predicate::DynamicField { field_id: 3, .. })
        ));
    }

    #[test]
    fn test_global_width_applies_without_personal_row() {
        let static_fields = fields();
        let rights = rights_all(&static_fields, &[]);
        let settings = ViewSettings {
            view: merge_by_column(vec![row(
                "name",
                false,
                ViewRule {
                    hidden: false,
                    width: Some(240),
                },
            )]),
            ..Default::default()
        };

        let view = resolve_view(&static_fields, &[], &rights, &settings);
        let name = view.columns.iter().find(|c| c.key == "name").unwrap();
        assert_eq!(name.width, Some(240));
    }
}
