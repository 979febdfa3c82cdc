use anyhow::Result;
use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use serde_json::json;

use crate::config::config_model::Replica;
use crate::domain::{
    repositories::replica::ReplicaStore, value_objects::settlement::SettlementMirror,
};

/// Mirrors settlement writes into the Supabase project over PostgREST so the
/// read-side app that queries Supabase directly sees the same ledger. The
/// primary Postgres transaction has already committed by the time this runs.
pub struct SupabaseRestReplica {
    http: reqwest::Client,
    base_url: String,
    service_key: String,
}

impl SupabaseRestReplica {
    pub fn new(config: &Replica) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: config.project_url.trim_end_matches('/').to_string(),
            service_key: config.service_role_key.clone(),
        }
    }

    fn rest_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }

    async fn ensure_success(resp: reqwest::Response, context: &str) -> Result<()> {
        if resp.status().is_success() {
            return Ok(());
        }
        let status = resp.status();
        let body = resp.text().await.unwrap_or_default();
        let preview = body.chars().take(512).collect::<String>();
        anyhow::bail!("{} failed (status {}): {}", context, status, preview)
    }
}

#[async_trait]
impl ReplicaStore for SupabaseRestReplica {
    async fn mirror_settlement(&self, mirror: &SettlementMirror) -> Result<()> {
        for group in &mirror.groups {
            // Upsert keyed on (schedule_id, inventory_date) so replays of the
            // same settlement converge instead of duplicating rows.
            let resp = self
                .http
                .post(self.rest_url("inventories"))
                .query(&[("on_conflict", "schedule_id,inventory_date")])
                .header("apikey", &self.service_key)
                .header(AUTHORIZATION, format!("Bearer {}", self.service_key))
                .header(CONTENT_TYPE, "application/json")
                .header("Prefer", "resolution=merge-duplicates")
                .json(&json!([{
                    "schedule_id": group.schedule_id,
                    "inventory_date": group.inventory_date,
                    "total_capacity": group.total_capacity,
                    "booked_units": group.booked_units,
                    "available_units": group.available_units,
                }]))
                .send()
                .await?;
            Self::ensure_success(resp, "mirror inventories upsert").await?;

            let item_filter = format!(
                "in.({})",
                group
                    .item_ids
                    .iter()
                    .map(|id| id.to_string())
                    .collect::<Vec<_>>()
                    .join(",")
            );
            let resp = self
                .http
                .patch(self.rest_url("booking_items"))
                .query(&[("id", item_filter.as_str())])
                .header("apikey", &self.service_key)
                .header(AUTHORIZATION, format!("Bearer {}", self.service_key))
                .header(CONTENT_TYPE, "application/json")
                .json(&json!({ "inventory_id": group.inventory_id }))
                .send()
                .await?;
            Self::ensure_success(resp, "mirror booking_items link").await?;

            let schedule_filter = format!("eq.{}", group.schedule_id);
            let resp = self
                .http
                .patch(self.rest_url("schedules"))
                .query(&[("id", schedule_filter.as_str())])
                .header("apikey", &self.service_key)
                .header(AUTHORIZATION, format!("Bearer {}", self.service_key))
                .header(CONTENT_TYPE, "application/json")
                .json(&json!({ "booked_seats": group.booked_units }))
                .send()
                .await?;
            Self::ensure_success(resp, "mirror schedules counter").await?;
        }

        Ok(())
    }
}
