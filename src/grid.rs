//! Grid widget configuration.
//!
//! The page hands the browser grid a JSON `gridOptions` object. Everything the user can
//! pick in the sidebar arrives as loose query parameters; [`GridOptions::from_query`]
//! turns them into typed options once, and [`GridOptions::to_grid_options`] renders the
//! widget JSON from the typed form. Sorting, filtering, grouping, pivoting and the
//! aggregation itself all happen inside the widget.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::error::GridConfigError;

/// Columns of the sales table, in display order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ColumnId {
    Date,
    Product,
    Category,
    Region,
    SalesRep,
    Quantity,
    UnitPrice,
    TotalAmount,
    ProfitMargin,
}

impl ColumnId {
    pub const ALL: [ColumnId; 9] = [
        ColumnId::Date,
        ColumnId::Product,
        ColumnId::Category,
        ColumnId::Region,
        ColumnId::SalesRep,
        ColumnId::Quantity,
        ColumnId::UnitPrice,
        ColumnId::TotalAmount,
        ColumnId::ProfitMargin,
    ];

    /// Field name in the row JSON.
    pub fn field(self) -> &'static str {
        match self {
            ColumnId::Date => "date",
            ColumnId::Product => "product",
            ColumnId::Category => "category",
            ColumnId::Region => "region",
            ColumnId::SalesRep => "salesRep",
            ColumnId::Quantity => "quantity",
            ColumnId::UnitPrice => "unitPrice",
            ColumnId::TotalAmount => "totalAmount",
            ColumnId::ProfitMargin => "profitMargin",
        }
    }

    pub fn header(self) -> &'static str {
        match self {
            ColumnId::Date => "Date",
            ColumnId::Product => "Product",
            ColumnId::Category => "Category",
            ColumnId::Region => "Region",
            ColumnId::SalesRep => "Sales Rep",
            ColumnId::Quantity => "Quantity",
            ColumnId::UnitPrice => "Unit Price",
            ColumnId::TotalAmount => "Total Amount",
            ColumnId::ProfitMargin => "Profit Margin",
        }
    }

    pub fn is_numeric(self) -> bool {
        matches!(
            self,
            ColumnId::Quantity | ColumnId::UnitPrice | ColumnId::TotalAmount | ColumnId::ProfitMargin
        )
    }

    /// Categorical columns can be row groups or pivot axes.
    pub fn is_groupable(self) -> bool {
        !self.is_numeric()
    }

    pub fn default_aggregation(self) -> Option<AggFunc> {
        match self {
            ColumnId::Quantity | ColumnId::TotalAmount => Some(AggFunc::Sum),
            ColumnId::UnitPrice | ColumnId::ProfitMargin => Some(AggFunc::Avg),
            _ => None,
        }
    }

    /// Decimal places shown by the grid.
    pub fn precision(self) -> Option<u8> {
        match self {
            ColumnId::UnitPrice | ColumnId::TotalAmount => Some(2),
            ColumnId::ProfitMargin => Some(1),
            _ => None,
        }
    }
}

impl fmt::Display for ColumnId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.header())
    }
}

impl FromStr for ColumnId {
    type Err = GridConfigError;

    /// Accepts the field name, the header or a snake_case spelling.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = normalize(s);
        ColumnId::ALL
            .into_iter()
            .find(|c| normalize(c.field()) == wanted || normalize(c.header()) == wanted)
            .ok_or_else(|| GridConfigError::UnknownColumn(s.trim().to_string()))
    }
}

fn normalize(s: &str) -> String {
    s.chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AggFunc {
    Sum,
    Avg,
    Count,
    Min,
    Max,
}

impl AggFunc {
    pub fn as_str(self) -> &'static str {
        match self {
            AggFunc::Sum => "sum",
            AggFunc::Avg => "avg",
            AggFunc::Count => "count",
            AggFunc::Min => "min",
            AggFunc::Max => "max",
        }
    }
}

impl FromStr for AggFunc {
    type Err = GridConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sum" => Ok(AggFunc::Sum),
            "avg" | "average" | "mean" => Ok(AggFunc::Avg),
            "count" => Ok(AggFunc::Count),
            "min" => Ok(AggFunc::Min),
            "max" => Ok(AggFunc::Max),
            _ => Err(GridConfigError::UnknownAggregation(s.trim().to_string())),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Alpine,
    Balham,
    Material,
}

impl Theme {
    /// CSS class the grid container gets.
    pub fn class_name(self) -> &'static str {
        match self {
            Theme::Alpine => "ag-theme-alpine",
            Theme::Balham => "ag-theme-balham",
            Theme::Material => "ag-theme-material",
        }
    }
}

impl FromStr for Theme {
    type Err = GridConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "alpine" => Ok(Theme::Alpine),
            "balham" => Ok(Theme::Balham),
            "material" => Ok(Theme::Material),
            _ => Err(GridConfigError::UnknownTheme(s.trim().to_string())),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SelectionMode {
    Single,
    Multiple,
}

impl SelectionMode {
    pub fn as_str(self) -> &'static str {
        match self {
            SelectionMode::Single => "single",
            SelectionMode::Multiple => "multiple",
        }
    }
}

/// Download format for the export buttons.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Csv,
    Xlsx,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Xlsx => "xlsx",
        }
    }

    pub fn content_type(self) -> &'static str {
        match self {
            ExportFormat::Csv => "text/csv",
            ExportFormat::Xlsx => {
                "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
            }
        }
    }
}

impl FromStr for ExportFormat {
    type Err = GridConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "csv" => Ok(ExportFormat::Csv),
            "xlsx" | "excel" => Ok(ExportFormat::Xlsx),
            _ => Err(GridConfigError::UnknownExportFormat(s.trim().to_string())),
        }
    }
}

/// Pivot table layout.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PivotConfig {
    pub rows: Vec<ColumnId>,
    pub columns: Vec<ColumnId>,
    pub values: Vec<ColumnId>,
    pub agg: AggFunc,
}

pub const TABLE_HEIGHT_RANGE: std::ops::RangeInclusive<u32> = 300..=800;
pub const PAGE_SIZES: [u32; 4] = [10, 20, 50, 100];

/// Typed grid configuration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GridOptions {
    pub sortable: bool,
    pub filterable: bool,
    pub selection: Option<SelectionMode>,
    pub group_by: Vec<ColumnId>,
    pub show_totals: bool,
    pub aggregations: BTreeMap<ColumnId, AggFunc>,
    pub pivot: Option<PivotConfig>,
    pub page_size: Option<u32>,
    pub theme: Theme,
    pub height: u32,
}

impl Default for GridOptions {
    fn default() -> Self {
        Self {
            sortable: true,
            filterable: true,
            selection: Some(SelectionMode::Multiple),
            group_by: Vec::new(),
            show_totals: true,
            aggregations: default_aggregations(),
            pivot: None,
            page_size: None,
            theme: Theme::Alpine,
            height: 400,
        }
    }
}

fn default_aggregations() -> BTreeMap<ColumnId, AggFunc> {
    ColumnId::ALL
        .into_iter()
        .filter_map(|c| c.default_aggregation().map(|agg| (c, agg)))
        .collect()
}

/// Raw sidebar choices as they arrive in a query string.
///
/// Lists are comma separated, aggregations are `column:function` pairs
/// (`totalAmount:sum,unitPrice:max`).
#[derive(Clone, Debug, Default, Deserialize)]
pub struct GridQuery {
    pub sortable: Option<bool>,
    pub filterable: Option<bool>,
    pub selection: Option<String>,
    pub group_by: Option<String>,
    pub show_totals: Option<bool>,
    pub agg: Option<String>,
    pub pivot_rows: Option<String>,
    pub pivot_cols: Option<String>,
    pub pivot_values: Option<String>,
    pub pivot_agg: Option<String>,
    pub page_size: Option<u32>,
    pub theme: Option<String>,
    pub height: Option<u32>,
}

impl GridOptions {
    /// Parse and validate raw sidebar choices.
    ///
    /// Missing values fall back to [`GridOptions::default`].
    pub fn from_query(query: &GridQuery) -> Result<GridOptions, GridConfigError> {
        let defaults = GridOptions::default();

        let selection_name = query
            .selection
            .as_deref()
            .map(|s| s.trim().to_ascii_lowercase());
        let selection = match selection_name.as_deref() {
            None => defaults.selection,
            Some("" | "none") => None,
            Some("single") => Some(SelectionMode::Single),
            Some("multiple") => Some(SelectionMode::Multiple),
            Some(other) => return Err(GridConfigError::UnknownSelectionMode(other.to_string())),
        };

        let mut aggregations = defaults.aggregations;
        for entry in split_list(query.agg.as_deref()) {
            let (column, func) = entry
                .split_once(':')
                .ok_or_else(|| GridConfigError::MalformedAggregation(entry.to_string()))?;
            aggregations.insert(column.parse()?, func.parse()?);
        }

        let pivot_rows = parse_columns(query.pivot_rows.as_deref())?;
        let pivot_columns = parse_columns(query.pivot_cols.as_deref())?;
        let pivot_values = parse_columns(query.pivot_values.as_deref())?;
        let pivot_agg = match query.pivot_agg.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(agg) => Some(agg.parse::<AggFunc>()?),
        };
        // Any pivot parameter turns pivot mode on; validate() rejects a half-filled one.
        let pivot = if pivot_rows.is_empty()
            && pivot_columns.is_empty()
            && pivot_values.is_empty()
            && pivot_agg.is_none()
        {
            None
        } else {
            Some(PivotConfig {
                rows: pivot_rows,
                columns: pivot_columns,
                values: pivot_values,
                agg: pivot_agg.unwrap_or(AggFunc::Sum),
            })
        };

        let options = GridOptions {
            sortable: query.sortable.unwrap_or(defaults.sortable),
            filterable: query.filterable.unwrap_or(defaults.filterable),
            selection,
            group_by: parse_columns(query.group_by.as_deref())?,
            show_totals: query.show_totals.unwrap_or(defaults.show_totals),
            aggregations,
            pivot,
            page_size: query.page_size,
            theme: match query.theme.as_deref() {
                Some(theme) => theme.parse()?,
                None => defaults.theme,
            },
            height: query.height.unwrap_or(defaults.height),
        };
        options.validate()?;
        Ok(options)
    }

    /// Check the column kinds and numeric bounds.
    pub fn validate(&self) -> Result<(), GridConfigError> {
        if let Some(column) = self.group_by.iter().find(|c| !c.is_groupable()) {
            return Err(GridConfigError::NotGroupable(*column));
        }
        if let Some(column) = self.aggregations.keys().find(|c| !c.is_numeric()) {
            return Err(GridConfigError::NotNumeric(*column));
        }
        if let Some(pivot) = &self.pivot {
            if pivot.rows.is_empty() || pivot.values.is_empty() {
                return Err(GridConfigError::IncompletePivot);
            }
            if let Some(column) = pivot
                .rows
                .iter()
                .chain(&pivot.columns)
                .find(|c| !c.is_groupable())
            {
                return Err(GridConfigError::NotGroupable(*column));
            }
            if let Some(column) = pivot.values.iter().find(|c| !c.is_numeric()) {
                return Err(GridConfigError::NotNumeric(*column));
            }
        }
        if !TABLE_HEIGHT_RANGE.contains(&self.height) {
            return Err(GridConfigError::HeightOutOfRange(self.height));
        }
        if let Some(size) = self.page_size {
            if !PAGE_SIZES.contains(&size) {
                return Err(GridConfigError::UnsupportedPageSize(size));
            }
        }
        Ok(())
    }

    /// Render the widget's `gridOptions` JSON.
    pub fn to_grid_options(&self) -> Value {
        let column_defs: Vec<Value> = ColumnId::ALL
            .into_iter()
            .map(|column| Value::Object(self.column_def(column)))
            .collect();

        let grouped = !self.group_by.is_empty();
        let mut options = json!({
            "columnDefs": column_defs,
            "defaultColDef": {
                "sortable": self.sortable,
                "filter": self.filterable,
                "resizable": true,
                "editable": false,
                "enableRowGroup": true,
                "enablePivot": true,
                "enableValue": true,
            },
            "pivotMode": self.pivot.is_some(),
            "groupIncludeFooter": self.show_totals && grouped,
            "groupIncludeTotalFooter": self.show_totals,
            "sideBar": true,
            "animateRows": true,
            "pagination": self.page_size.is_some(),
        });

        if let Value::Object(map) = &mut options {
            if let Some(size) = self.page_size {
                map.insert("paginationPageSize".into(), json!(size));
            }
            if let Some(mode) = self.selection {
                map.insert("rowSelection".into(), json!(mode.as_str()));
                map.insert("groupSelectsChildren".into(), json!(true));
                map.insert("groupSelectsFiltered".into(), json!(true));
            }
        }
        options
    }

    fn column_def(&self, column: ColumnId) -> Map<String, Value> {
        let mut def = Map::new();
        def.insert("field".into(), json!(column.field()));
        def.insert("headerName".into(), json!(column.header()));

        if self.filterable {
            let filter = match column {
                ColumnId::Date => "agDateColumnFilter",
                c if c.is_numeric() => "agNumberColumnFilter",
                _ => "agTextColumnFilter",
            };
            def.insert("filter".into(), json!(filter));
        }
        if column.is_numeric() {
            def.insert("type".into(), json!("numericColumn"));
        }
        if let Some(places) = column.precision() {
            def.insert(
                "valueFormatter".into(),
                json!(format!("value == null ? '' : Number(value).toFixed({})", places)),
            );
        }

        match column {
            ColumnId::ProfitMargin => {
                def.insert(
                    "cellClassRules".into(),
                    json!({ "margin-high": "x > 40", "margin-low": "x < 20" }),
                );
            }
            ColumnId::TotalAmount => {
                def.insert("cellClassRules".into(), json!({ "amount-large": "x > 1000" }));
            }
            ColumnId::Date => {
                if let Some(mode) = self.selection {
                    def.insert("checkboxSelection".into(), json!(true));
                    def.insert(
                        "headerCheckboxSelection".into(),
                        json!(mode == SelectionMode::Multiple),
                    );
                }
            }
            _ => {}
        }

        match &self.pivot {
            Some(pivot) => {
                if let Some(index) = pivot.rows.iter().position(|c| *c == column) {
                    def.insert("rowGroup".into(), json!(true));
                    def.insert("rowGroupIndex".into(), json!(index));
                    def.insert("hide".into(), json!(true));
                }
                if let Some(index) = pivot.columns.iter().position(|c| *c == column) {
                    def.insert("pivot".into(), json!(true));
                    def.insert("pivotIndex".into(), json!(index));
                    def.insert("hide".into(), json!(true));
                }
                if pivot.values.contains(&column) {
                    def.insert("aggFunc".into(), json!(pivot.agg.as_str()));
                }
            }
            None => {
                if let Some(index) = self.group_by.iter().position(|c| *c == column) {
                    def.insert("rowGroup".into(), json!(true));
                    def.insert("rowGroupIndex".into(), json!(index));
                    def.insert("hide".into(), json!(true));
                }
                if let Some(agg) = self.aggregations.get(&column) {
                    def.insert("aggFunc".into(), json!(agg.as_str()));
                }
            }
        }

        def
    }
}

fn split_list(raw: Option<&str>) -> impl Iterator<Item = &str> {
    raw.unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

fn parse_columns(raw: Option<&str>) -> Result<Vec<ColumnId>, GridConfigError> {
    let mut columns = Vec::new();
    for column in split_list(raw).map(str::parse::<ColumnId>) {
        let column = column?;
        if !columns.contains(&column) {
            columns.push(column);
        }
    }
    Ok(columns)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn column<'a>(options: &'a Value, field: &str) -> &'a Value {
        options["columnDefs"]
            .as_array()
            .unwrap()
            .iter()
            .find(|c| c["field"] == field)
            .unwrap()
    }

    #[test]
    fn column_names_parse_in_every_spelling() {
        assert_eq!("salesRep".parse::<ColumnId>(), Ok(ColumnId::SalesRep));
        assert_eq!("Sales Rep".parse::<ColumnId>(), Ok(ColumnId::SalesRep));
        assert_eq!("sales_rep".parse::<ColumnId>(), Ok(ColumnId::SalesRep));
        assert_eq!("TOTAL AMOUNT".parse::<ColumnId>(), Ok(ColumnId::TotalAmount));
        assert_eq!(
            "Discount".parse::<ColumnId>(),
            Err(GridConfigError::UnknownColumn("Discount".into()))
        );
    }

    #[test]
    fn defaults_cover_every_column() {
        let options = GridOptions::from_query(&GridQuery::default()).unwrap();
        assert_eq!(options, GridOptions::default());

        let json = options.to_grid_options();
        assert_eq!(json["columnDefs"].as_array().unwrap().len(), 9);
        assert_eq!(column(&json, "totalAmount")["aggFunc"], "sum");
        assert_eq!(column(&json, "unitPrice")["aggFunc"], "avg");
        assert_eq!(column(&json, "quantity")["aggFunc"], "sum");
        assert_eq!(column(&json, "profitMargin")["aggFunc"], "avg");
        assert!(column(&json, "region").get("aggFunc").is_none());
        assert_eq!(column(&json, "date")["filter"], "agDateColumnFilter");
        assert_eq!(column(&json, "date")["checkboxSelection"], true);
        assert_eq!(column(&json, "profitMargin")["cellClassRules"]["margin-high"], "x > 40");
        assert_eq!(json["rowSelection"], "multiple");
        assert_eq!(json["pivotMode"], false);
        assert_eq!(json["pagination"], false);
        assert_eq!(json["groupIncludeFooter"], false);
    }

    #[test]
    fn grouping_and_aggregation_overrides() {
        let query = GridQuery {
            group_by: Some("Category, region".into()),
            agg: Some("totalAmount:max,unit price:count".into()),
            selection: Some("none".into()),
            page_size: Some(50),
            theme: Some("Balham".into()),
            ..Default::default()
        };
        let options = GridOptions::from_query(&query).unwrap();
        assert_eq!(options.group_by, vec![ColumnId::Category, ColumnId::Region]);
        assert_eq!(options.theme, Theme::Balham);
        assert_eq!(options.selection, None);

        let json = options.to_grid_options();
        assert_eq!(column(&json, "category")["rowGroup"], true);
        assert_eq!(column(&json, "region")["rowGroupIndex"], 1);
        assert_eq!(column(&json, "totalAmount")["aggFunc"], "max");
        assert_eq!(column(&json, "unitPrice")["aggFunc"], "count");
        assert_eq!(json["paginationPageSize"], 50);
        assert_eq!(json["groupIncludeFooter"], true);
        assert!(json.get("rowSelection").is_none());
    }

    #[test]
    fn pivot_layout() {
        let query = GridQuery {
            pivot_rows: Some("category".into()),
            pivot_cols: Some("region".into()),
            pivot_values: Some("totalAmount,quantity".into()),
            pivot_agg: Some("avg".into()),
            ..Default::default()
        };
        let json = GridOptions::from_query(&query).unwrap().to_grid_options();
        assert_eq!(json["pivotMode"], true);
        assert_eq!(column(&json, "category")["rowGroup"], true);
        assert_eq!(column(&json, "region")["pivot"], true);
        assert_eq!(column(&json, "totalAmount")["aggFunc"], "avg");
        assert_eq!(column(&json, "quantity")["aggFunc"], "avg");
        assert!(column(&json, "profitMargin").get("aggFunc").is_none());
    }

    #[test]
    fn rejects_wrong_column_kinds() {
        let group_numeric = GridQuery {
            group_by: Some("quantity".into()),
            ..Default::default()
        };
        assert_eq!(
            GridOptions::from_query(&group_numeric),
            Err(GridConfigError::NotGroupable(ColumnId::Quantity))
        );

        let agg_text = GridQuery {
            agg: Some("region:sum".into()),
            ..Default::default()
        };
        assert_eq!(
            GridOptions::from_query(&agg_text),
            Err(GridConfigError::NotNumeric(ColumnId::Region))
        );

        let pivot_without_values = GridQuery {
            pivot_rows: Some("category".into()),
            ..Default::default()
        };
        assert_eq!(
            GridOptions::from_query(&pivot_without_values),
            Err(GridConfigError::IncompletePivot)
        );
    }

    #[test]
    fn rejects_unknown_names_and_bounds() {
        let cases = [
            (
                GridQuery { theme: Some("dark".into()), ..Default::default() },
                GridConfigError::UnknownTheme("dark".into()),
            ),
            (
                GridQuery { agg: Some("quantity:median".into()), ..Default::default() },
                GridConfigError::UnknownAggregation("median".into()),
            ),
            (
                GridQuery { agg: Some("quantity".into()), ..Default::default() },
                GridConfigError::MalformedAggregation("quantity".into()),
            ),
            (
                GridQuery { selection: Some("some".into()), ..Default::default() },
                GridConfigError::UnknownSelectionMode("some".into()),
            ),
            (
                GridQuery { height: Some(900), ..Default::default() },
                GridConfigError::HeightOutOfRange(900),
            ),
            (
                GridQuery { page_size: Some(15), ..Default::default() },
                GridConfigError::UnsupportedPageSize(15),
            ),
            (
                GridQuery { pivot_cols: Some("bogus".into()), ..Default::default() },
                GridConfigError::UnknownColumn("bogus".into()),
            ),
            (
                GridQuery { pivot_agg: Some("median".into()), ..Default::default() },
                GridConfigError::UnknownAggregation("median".into()),
            ),
            (
                GridQuery { pivot_cols: Some("region".into()), ..Default::default() },
                GridConfigError::IncompletePivot,
            ),
            (
                GridQuery { pivot_agg: Some("avg".into()), ..Default::default() },
                GridConfigError::IncompletePivot,
            ),
            (
                GridQuery {
                    pivot_rows: Some("region".into()),
                    pivot_values: Some("total_amount".into()),
                    pivot_cols: Some("quantity".into()),
                    ..Default::default()
                },
                GridConfigError::NotGroupable(ColumnId::Quantity),
            ),
        ];
        for (query, expected) in cases {
            assert_eq!(GridOptions::from_query(&query), Err(expected));
        }
    }

    #[test]
    fn export_format_names() {
        assert_eq!("CSV".parse::<ExportFormat>(), Ok(ExportFormat::Csv));
        assert_eq!("excel".parse::<ExportFormat>(), Ok(ExportFormat::Xlsx));
        assert!("pdf".parse::<ExportFormat>().is_err());
        assert_eq!(Theme::Material.class_name(), "ag-theme-material");
    }
}
