/*!
# Sales Grid Demo

A browser-based demonstration of interactive data tables, backed by reproducible
synthetic sales data generated in Rust.

## Overview

The page shows a sales dataset inside a third-party grid widget (AG Grid) with sorting,
filtering, grouping, pivoting and export. All of that table behaviour lives in the widget.
This crate owns the parts around it: generating the data, describing the grid
configuration in typed form, and turning rows into downloads.

## Architecture

### Frontend Layer
- **Technologies**: HTML, CSS, AG Grid from a CDN
- **Key Components**:
  - Sidebar - dataset size, theme, height, selection, demo mode
  - Summary Cards - total sales, average order, order count, average margin
  - Grid - rows and `gridOptions` fetched from the backend

### Backend Layer
- **Technologies**: Rust, axum
- **Core Components**:
  - Sample Data Generator - seeded sales records with exact derived totals
  - Market Data Generator - seeded stock quotes for the finance table
  - Grid Configuration - typed, validated widget options
  - Exporter - CSV and XLSX downloads

## Data Model

Every [`SalesRecord`] carries a date, product, category, region, sales rep, quantity,
unit price, total amount and profit margin. Categorical fields are enums, money is kept in
whole cents, so `total_amount == quantity * unit_price` holds exactly.

## Modules

- **record**: Sales record, enumerations and fixed-point amounts
- **generator**: Seeded sales data generation
- **dataset**: Immutable dataset wrapper, filters and summary figures
- **market**: Seeded stock quote generation
- **grid**: Grid configuration parsing, validation and rendering
- **downloader**: Export functionality (CSV, XLSX)
- **config**: Server settings
- **app**: Routing and handlers

## REST API Endpoints

- `/api/sales` - Generated rows plus summary
- `/api/summary` - Summary figures only
- `/api/finance` - Stock quotes
- `/api/grid-options` - Validated grid options
- `/api/export` - CSV / XLSX download, optionally of selected rows
*/

pub mod app;
pub mod config;
pub mod dataset;
pub mod downloader;
pub mod error;
pub mod generator;
pub mod grid;
pub mod market;
pub mod record;

/// Re-export the everyday types
pub use dataset::*;
pub use error::*;
pub use generator::*;
pub use record::*;
