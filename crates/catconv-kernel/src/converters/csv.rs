//! CSV items, including the v7 `tableStyle` translation.

use super::item::{ItemSpec, Required, convert_item};
use super::props::{CopyProp, is_truthy};
use crate::convert::Converter;
use crate::member::{CatalogMember, JsonObject, MemberResult};
use crate::message::ModelType;
use crate::options::ConversionOptions;
use serde_json::Value;

const CSV_ITEM_PROPS: &[CopyProp] = &[
    CopyProp::renamed("data", "csvString"),
    CopyProp::renamed("showWarnings", "showUnmatchedRegionsWarning"),
    CopyProp::translated("polling", "polling", polling),
];

/// Item-level fields folded into the default time style.
const TIME_FIELDS: [&str; 3] = ["idColumns", "timeColumn", "isSampled"];

const CSV_ITEM: ItemSpec = ItemSpec {
    required: Required::AnyOf(&["url", "data"]),
    props: CSV_ITEM_PROPS,
    known: &["tableStyle", "idColumns", "timeColumn", "isSampled"],
    feature_info: true,
    ..ItemSpec::new("csv", ModelType::CsvItem)
};

/// `csv` -> `csv`.
pub fn csv_item(
    converter: &mut Converter<'_>,
    member: &CatalogMember<'_>,
    options: &ConversionOptions,
) -> MemberResult {
    let mut result = convert_item(converter, &CSV_ITEM, member, options);
    if let (Some(converted), Some(style)) = (result.member.as_mut(), member.get_object("tableStyle")) {
        converted.extend(table_style(member.raw(), style));
    }
    result
}

fn polling(value: &Value, _source: &JsonObject) -> Option<Value> {
    let polling = value.as_object()?;
    let mut converted = JsonObject::new();
    if let Some(url) = polling.get("url").filter(|url| url.is_string()) {
        converted.insert("url".to_string(), url.clone());
    }
    if let Some(seconds) = polling.get("seconds").filter(|seconds| seconds.is_number()) {
        converted.insert("seconds".to_string(), seconds.clone());
    }
    if let Some(replace) = polling.get("replace").filter(|replace| replace.is_boolean()) {
        converted.insert("shouldReplaceData".to_string(), replace.clone());
    }
    Some(Value::Object(converted))
}

/// v7 table style as v8 table traits: columns, per-column styles, default
/// column and default style.
fn table_style(item: &JsonObject, style: &JsonObject) -> JsonObject {
    let mut traits = JsonObject::new();
    let mut default_style = JsonObject::new();

    if let Some(columns) = style.get("columns").and_then(Value::as_object) {
        let converted_columns = columns
            .iter()
            .map(|(name, definition)| {
                let mut column = JsonObject::new();
                column.insert("name".to_string(), Value::String(name.clone()));
                column.extend(column_traits(definition));
                Value::Object(column)
            })
            .collect();
        traits.insert("columns".to_string(), Value::Array(converted_columns));

        let styles = columns
            .iter()
            .filter_map(|(name, definition)| {
                let definition = definition.as_object()?;
                let color = color_traits(definition);
                let time = time_traits(definition);
                if color.is_none() && time.is_none() {
                    return None;
                }
                let mut column_style = JsonObject::new();
                column_style.insert("id".to_string(), Value::String(name.clone()));
                if let Some(color) = color {
                    column_style.insert("color".to_string(), Value::Object(color));
                }
                if let Some(time) = time {
                    column_style.insert("time".to_string(), Value::Object(time));
                }
                Some(Value::Object(column_style))
            })
            .collect();
        traits.insert("styles".to_string(), Value::Array(styles));

        if let Some(lines) = chart_lines(columns) {
            let mut chart = JsonObject::new();
            chart.insert("lines".to_string(), Value::Array(lines));
            default_style.insert("chart".to_string(), Value::Object(chart));
        }
    }

    if let Some(active) = style.get("dataVariable").filter(|active| active.is_string()) {
        traits.insert("activeStyle".to_string(), active.clone());
    }

    let default_column = column_traits(&Value::Object(style.clone()));
    if !default_column.is_empty() {
        traits.insert("defaultColumn".to_string(), Value::Object(default_column));
    }

    let mut time = time_traits(style).unwrap_or_default();
    for field in TIME_FIELDS {
        if let Some(value) = item.get(field).filter(|value| is_truthy(value)) {
            time.insert(field.to_string(), value.clone());
        }
    }
    default_style.insert("time".to_string(), Value::Object(time));

    if let Some(color) = color_traits(style) {
        default_style.insert("color".to_string(), Value::Object(color));
    }
    traits.insert("defaultStyle".to_string(), Value::Object(default_style));

    clear_empties(&mut traits);
    traits
}

fn column_traits(definition: &Value) -> JsonObject {
    let mut column = JsonObject::new();
    let Some(definition) = definition.as_object() else {
        return column;
    };
    if definition
        .get("type")
        .and_then(Value::as_str)
        .is_some_and(|kind| kind.eq_ignore_ascii_case("hidden"))
    {
        column.insert("type".to_string(), Value::String("hidden".to_string()));
    }
    if let Some(units) = definition.get("units").filter(|units| units.is_string()) {
        column.insert("units".to_string(), units.clone());
    }
    if let Some(title) = ["title", "name"]
        .iter()
        .find_map(|key| definition.get(*key).filter(|title| title.is_string()))
    {
        column.insert("title".to_string(), title.clone());
    }
    if let Some(format) = definition.get("format").filter(|format| format.is_object()) {
        column.insert("format".to_string(), format.clone());
    }
    for key in ["replaceWithZeroValues", "replaceWithNullValues"] {
        if let Some(values) = definition.get(key).filter(|values| values.is_array()) {
            column.insert(key.to_string(), values.clone());
        }
    }
    column
}

fn time_traits(style: &JsonObject) -> Option<JsonObject> {
    let mut time = JsonObject::new();
    match style.get("timeColumn") {
        Some(Value::String(column)) => {
            time.insert("timeColumn".to_string(), Value::String(column.clone()));
        }
        Some(Value::Array(columns)) => {
            if let [Value::String(start), Value::String(end), ..] = columns.as_slice() {
                time.insert("timeColumn".to_string(), Value::String(start.clone()));
                time.insert("endTimeColumn".to_string(), Value::String(end.clone()));
            }
        }
        Some(Value::Null) => {
            time.insert("timeColumn".to_string(), Value::Null);
        }
        _ => {}
    }
    (!time.is_empty()).then_some(time)
}

fn chart_lines(columns: &JsonObject) -> Option<Vec<Value>> {
    let lines: Vec<Value> = columns
        .iter()
        .filter_map(|(name, column)| {
            let column = column.as_object()?;
            let mut line = JsonObject::new();
            let fields: [(&str, &str, fn(&Value) -> bool); 4] = [
                ("chartLineColor", "color", Value::is_string),
                ("yAxisMin", "yAxisMinimum", Value::is_number),
                ("yAxisMax", "yAxisMaximum", Value::is_number),
                ("active", "isSelectedInWorkbench", Value::is_boolean),
            ];
            for (v7, v8, accepts) in fields {
                if let Some(value) = column.get(v7).filter(|value| accepts(value)) {
                    line.insert(v8.to_string(), value.clone());
                }
            }
            if line.is_empty() {
                return None;
            }
            line.insert("yAxisColumn".to_string(), Value::String(name.clone()));
            Some(Value::Object(line))
        })
        .collect();
    (!lines.is_empty()).then_some(lines)
}

fn color_traits(style: &JsonObject) -> Option<JsonObject> {
    let mut color = JsonObject::new();
    for key in ["nullColor", "nullLabel"] {
        if let Some(value) = style.get(key).filter(|value| value.is_string()) {
            color.insert(key.to_string(), value.clone());
        }
    }

    // A zero bin count disabled binning in v7; v8 has no equivalent.
    match style.get("colorBins") {
        Some(Value::Number(bins)) if bins.as_f64() != Some(0.0) => {
            color.insert("numberOfBins".to_string(), Value::Number(bins.clone()));
        }
        Some(Value::Array(bins)) => match bins.first() {
            Some(Value::Number(_)) => {
                color.insert("binMaximums".to_string(), Value::Array(bins.clone()));
            }
            Some(first)
                if first.get("color").is_some_and(Value::is_string)
                    && first.get("value").is_some_and(Value::is_string) =>
            {
                color.insert("enumColors".to_string(), Value::Array(bins.clone()));
            }
            _ => {}
        },
        _ => {}
    }

    let bin_colors: Option<Vec<Value>> = match style.get("colorMap") {
        Some(Value::String(map)) => Some(
            map.split('-')
                .map(|name| Value::String(name.to_string()))
                .collect(),
        ),
        Some(Value::Array(map)) if map.first().is_some_and(Value::is_string) => Some(map.clone()),
        Some(Value::Array(map)) => Some(
            map.iter()
                .filter_map(|stop| stop.get("color").filter(|color| color.is_string()).cloned())
                .collect(),
        ),
        _ => None,
    };
    if let Some(bin_colors) = bin_colors {
        if !color.contains_key("numberOfBins") {
            color.insert("numberOfBins".to_string(), Value::from(bin_colors.len()));
        }
        color.insert("binColors".to_string(), Value::Array(bin_colors));
    }

    if let Some(palette) = style.get("colorPalette").filter(|palette| palette.is_string()) {
        color.insert("colorPalette".to_string(), palette.clone());
    }

    (!color.is_empty()).then_some(color)
}

/// Drop nested objects and arrays left empty after translation.
fn clear_empties(object: &mut JsonObject) {
    object.retain(|_, value| {
        match value {
            Value::Object(nested) => {
                clear_empties(nested);
                !nested.is_empty()
            }
            Value::Array(items) => {
                for item in items.iter_mut() {
                    if let Value::Object(nested) = item {
                        clear_empties(nested);
                    }
                }
                !items.is_empty()
            }
            _ => true,
        }
    });
}
