//! Engine facade: the full pipeline from raw table + configuration to
//! encoded chart bytes, with the degraded-output policy applied at the top.
//!
//! Failure handling is graceful by construction: an unrecognized template or
//! incomplete configuration never propagates an error to the caller. The
//! worst outcome is a placeholder scene or the template's sample data.

use anyhow::Result;
use log::warn;

use crate::aggregate::aggregate_or_sample;
use crate::animate::AnimationScheduler;
use crate::cache::RenderCache;
use crate::compiler::{compile_scene, placeholder_scene};
use crate::config::ChartConfiguration;
use crate::data::DataTable;
use crate::ir::SceneGraph;
use crate::render::render_scene;
use crate::template::find_template;
use crate::RenderOptions;

/// Placeholder text when an aggregation legitimately produced nothing.
pub const NO_DATA_MESSAGE: &str = "No data to display";

/// Placeholder text when the template id resolves to nothing.
pub const UNKNOWN_TEMPLATE_MESSAGE: &str = "Unknown chart template";

#[derive(Debug, Default)]
pub struct ChartEngine {
    scheduler: AnimationScheduler,
    cache: RenderCache,
}

impl ChartEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compile a scene for the given table + configuration. Every call starts
    /// by cancelling any enter transitions still pending from the previous
    /// render of this engine.
    pub fn build_scene(
        &mut self,
        table: &DataTable,
        config: &ChartConfiguration,
        options: &RenderOptions,
    ) -> SceneGraph {
        self.scheduler.cancel_all();

        let Some(template) = find_template(&config.template_id) else {
            warn!("unknown template id '{}'", config.template_id);
            return placeholder_scene(options, UNKNOWN_TEMPLATE_MESSAGE);
        };

        // A complete configuration pointed at an empty table is the one case
        // that shows "no data" instead of sample data.
        if template.is_complete(config) && table.is_empty() {
            return placeholder_scene(options, NO_DATA_MESSAGE);
        }

        let data = aggregate_or_sample(table, config);
        let scene = compile_scene(&data, config, template.kind, options);

        if config.animate {
            self.scheduler.schedule(scene.hits.len());
        }
        scene
    }

    /// Full pipeline: scene + encode in the requested output format.
    pub fn render(
        &mut self,
        table: &DataTable,
        config: &ChartConfiguration,
        options: &RenderOptions,
    ) -> Result<Vec<u8>> {
        let scene = self.build_scene(table, config, options);
        render_scene(&scene, options.format.clone())
    }

    /// Render with output caching keyed by chart id. A hit returns the cached
    /// bytes without re-aggregating or re-encoding; callers invalidate the
    /// key when the chart's configuration or data changes.
    pub fn render_cached(
        &mut self,
        chart_id: &str,
        table: &DataTable,
        config: &ChartConfiguration,
        options: &RenderOptions,
    ) -> Result<Vec<u8>> {
        if let Some(bytes) = self.cache.get(chart_id) {
            return Ok(bytes.to_vec());
        }
        let bytes = self.render(table, config, options)?;
        self.cache.insert(chart_id, bytes.clone());
        Ok(bytes)
    }

    pub fn invalidate(&mut self, chart_id: &str) {
        self.cache.invalidate(chart_id);
    }

    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }

    /// Enter transitions still pending from the last build.
    pub fn pending_animations(&self) -> usize {
        self.scheduler.pending()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FieldRef;
    use crate::ir::DrawCommand;

    fn sales_table() -> DataTable {
        DataTable::new(
            vec!["region".into(), "amount".into()],
            vec![
                vec!["North".into(), "10".into()],
                vec!["South".into(), "20".into()],
            ],
        )
    }

    fn bar_config() -> ChartConfiguration {
        ChartConfiguration {
            template_id: "bar".into(),
            x_axis_field: Some(FieldRef::One("region".into())),
            y_axis_field: Some(FieldRef::One("amount".into())),
            ..Default::default()
        }
    }

    fn placeholder_text(scene: &SceneGraph) -> Option<String> {
        scene.commands.iter().find_map(|c| match c {
            DrawCommand::Text { content, .. } => Some(content.clone()),
            _ => None,
        })
    }

    #[test]
    fn test_unknown_template_yields_placeholder() {
        let mut engine = ChartEngine::new();
        let mut config = bar_config();
        config.template_id = "sunburst".into();
        let scene = engine.build_scene(&sales_table(), &config, &RenderOptions::default());
        assert_eq!(
            placeholder_text(&scene).as_deref(),
            Some(UNKNOWN_TEMPLATE_MESSAGE)
        );
        assert!(scene.hits.is_empty());
    }

    #[test]
    fn test_empty_table_yields_no_data() {
        let mut engine = ChartEngine::new();
        let empty = DataTable::new(vec!["region".into(), "amount".into()], Vec::new());
        let scene = engine.build_scene(&empty, &bar_config(), &RenderOptions::default());
        assert_eq!(placeholder_text(&scene).as_deref(), Some(NO_DATA_MESSAGE));
    }

    #[test]
    fn test_incomplete_config_gets_sample_data() {
        let mut engine = ChartEngine::new();
        let config = ChartConfiguration {
            template_id: "bar".into(),
            ..Default::default()
        };
        let scene = engine.build_scene(&sales_table(), &config, &RenderOptions::default());
        // Sample data produces real marks, not a placeholder
        assert!(!scene.hits.is_empty());
    }

    #[test]
    fn test_render_produces_png() {
        let mut engine = ChartEngine::new();
        let bytes = engine
            .render(&sales_table(), &bar_config(), &RenderOptions::default())
            .unwrap();
        assert_eq!(&bytes[..8], &[137, 80, 78, 71, 13, 10, 26, 10]);
    }

    #[test]
    fn test_cache_hit_and_invalidate() {
        let mut engine = ChartEngine::new();
        let table = sales_table();
        let config = bar_config();
        let options = RenderOptions::default();

        let first = engine.render_cached("chart-1", &table, &config, &options).unwrap();
        let second = engine.render_cached("chart-1", &table, &config, &options).unwrap();
        assert_eq!(first, second);

        engine.invalidate("chart-1");
        let third = engine.render_cached("chart-1", &table, &config, &options).unwrap();
        assert_eq!(first, third);
    }

    #[test]
    fn test_rebuild_schedules_fresh_animations() {
        let mut engine = ChartEngine::new();
        let scene = engine.build_scene(&sales_table(), &bar_config(), &RenderOptions::default());
        assert_eq!(engine.pending_animations(), scene.hits.len());

        let mut still = bar_config();
        still.animate = false;
        engine.build_scene(&sales_table(), &still, &RenderOptions::default());
        assert_eq!(engine.pending_animations(), 0);
    }
}
