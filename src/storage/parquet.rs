use arrow::array::{Float64Array, Int64Array, StringArray, UInt32Array};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;
use std::path::Path;
use std::sync::Arc;
use tempfile::NamedTempFile;
use tracing::info;

use crate::error::Result;
use crate::models::{Crop, MarketSnapshot, VendorListing};
use crate::utils::format_price;

/// Writes the inventory report: one row per vendor listing.
pub struct ReportExporter;

impl ReportExporter {
    fn schema() -> Arc<Schema> {
        Arc::new(Schema::new(vec![
            Field::new("crop_id", DataType::Utf8, false),
            Field::new("crop_name", DataType::Utf8, false),
            Field::new("category", DataType::Utf8, false),
            Field::new("vendor_id", DataType::Utf8, false),
            Field::new("vendor_name", DataType::Utf8, false),
            Field::new("price", DataType::Float64, false),
            Field::new("formatted_price", DataType::Utf8, false),
            Field::new("stock", DataType::Float64, false),
            Field::new("rating", DataType::Float64, false),
            Field::new("review_count", DataType::UInt32, false),
            Field::new("current_price", DataType::Float64, false),
            Field::new("snapshot_at", DataType::Int64, false),
        ]))
    }

    pub fn to_record_batch(snapshot: &MarketSnapshot) -> Result<RecordBatch> {
        let rows: Vec<(&Crop, &VendorListing)> = snapshot
            .crops
            .iter()
            .flat_map(|c| c.vendors.iter().map(move |l| (c, l)))
            .collect();

        // Listing overrides replace the crop name in the report
        let crop_names: StringArray = rows
            .iter()
            .map(|(c, l)| Some(l.listing_name_override.as_deref().unwrap_or(&c.name)))
            .collect();

        let crop_ids: StringArray = rows.iter().map(|(c, _)| Some(c.id.as_str())).collect();
        let categories: StringArray = rows.iter().map(|(c, _)| Some(c.category.as_str())).collect();
        let vendor_ids: StringArray = rows.iter().map(|(_, l)| Some(l.vendor_id.as_str())).collect();
        let vendor_names: StringArray = rows.iter().map(|(_, l)| Some(l.display_name.as_str())).collect();
        let prices: Float64Array = rows.iter().map(|(_, l)| Some(l.price)).collect();
        let formatted: StringArray = rows.iter().map(|(_, l)| Some(format_price(l.price))).collect();
        let stock: Float64Array = rows.iter().map(|(_, l)| Some(l.stock)).collect();
        let ratings: Float64Array = rows.iter().map(|(_, l)| Some(l.rating)).collect();
        let review_counts: UInt32Array = rows.iter().map(|(_, l)| Some(l.review_count)).collect();
        let current: Float64Array = rows.iter().map(|(c, _)| Some(c.current_price)).collect();
        let snapshot_at: Int64Array = rows.iter().map(|_| Some(snapshot.saved_at.timestamp())).collect();

        let batch = RecordBatch::try_new(
            Self::schema(),
            vec![
                Arc::new(crop_ids),
                Arc::new(crop_names),
                Arc::new(categories),
                Arc::new(vendor_ids),
                Arc::new(vendor_names),
                Arc::new(prices),
                Arc::new(formatted),
                Arc::new(stock),
                Arc::new(ratings),
                Arc::new(review_counts),
                Arc::new(current),
                Arc::new(snapshot_at),
            ],
        )?;

        Ok(batch)
    }

    /// Writes the report next to `output_path` and moves it into place once
    /// complete. Returns the number of rows written.
    pub fn write_report(snapshot: &MarketSnapshot, output_path: &Path) -> Result<usize> {
        let batch = Self::to_record_batch(snapshot)?;

        let dir = match output_path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir,
            _ => Path::new("."),
        };
        std::fs::create_dir_all(dir)?;
        let temp = NamedTempFile::new_in(dir)?;

        let mut writer = ArrowWriter::try_new(temp.reopen()?, batch.schema(), None)?;
        writer.write(&batch)?;
        writer.close()?;
        temp.persist(output_path).map_err(|e| e.error)?;

        info!(
            path = ?output_path,
            rows = batch.num_rows(),
            "Inventory report written"
        );
        Ok(batch.num_rows())
    }
}
