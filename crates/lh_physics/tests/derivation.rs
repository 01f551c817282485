// crates/lh_physics/tests/derivation.rs

//! 派生状态重建端到端测试
//!
//! # 测试覆盖
//!
//! - 单瓦片暖剖面：饱和面积、地下水位与估算器一致，无冰无锋面
//! - 跨 0 °C 剖面：锋面深度
//! - 层含水量守恒、冰不超过含水量
//! - 节点参数与瓦片顺序无关
//! - 稳定性警告每个超限瓦片一条
//! - 快速通量与完整剖面在均匀剖面下一致，近线性剖面下接近
//! - 仅完整能量平衡：节点水分无冰、层冰清零、无锋面
//! - 不需要节点水分时节点场保持检查点值
//! - 退化瓦片不被访问
//! - 致命错误携带例程名与瓦片位置

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use lh_config::ModelConfig;
use lh_physics::soil::{SoilColumn, SoilLayer};
use lh_physics::state::{CellState, GridCell};
use lh_physics::thermal::{set_node_parameters, uniform_node_depths};
use lh_physics::{
    ArnoSaturatedArea, IceContentScheme, NodeMoistureMode, PhysicsError, RetentionCurveWaterTable, SaturatedArea,
    SaturatedAreaEstimator, StateDeriver, TileId, WaterTableEstimator,
};

// ============================================================================
// 测试辅助函数
// ============================================================================

/// 冻土、完整剖面、隐式格式
fn frozen_config(nlayer: usize, nnode: usize) -> ModelConfig {
    let mut config = ModelConfig::default();
    config.options.frozen_soil = true;
    config.options.quick_flux = false;
    config.options.nlayer = nlayer;
    config.options.nnode = nnode;
    config
}

fn two_layer_column(nnode: usize) -> SoilColumn {
    let layers = vec![
        SoilLayer::mineral(0.3, 1450.0, 10.0, 25.0, 0.6),
        SoilLayer::mineral(0.7, 1550.0, 12.0, 35.0, 0.4),
    ];
    SoilColumn::new(layers, uniform_node_depths(nnode, 1.0))
}

/// 为所有有效瓦片设置含水量（最大含水量的比例）与节点温度
fn fill(cell: &mut GridCell, moist_frac: f64, temps: &[f64]) {
    let ids: Vec<TileId> = cell.active_tiles().collect();
    let max: Vec<f64> = cell.soil.layers.iter().map(|l| l.max_moist).collect();
    for id in ids {
        let tile = cell.tile_mut(id).unwrap();
        for (layer, &m) in tile.cell.layers.iter_mut().zip(&max) {
            layer.moist = moist_frac * m;
        }
        tile.energy.t = temps.to_vec();
    }
}

fn linear_profile(depths: &[f64], surface: f64, gradient: f64) -> Vec<f64> {
    depths.iter().map(|&z| surface + gradient * z).collect()
}

// ============================================================================
// 端到端
// ============================================================================

#[test]
fn test_warm_single_tile_matches_estimators() {
    let config = frozen_config(1, 5);
    let layer = SoilLayer::mineral(1.0, 1500.0, 11.0, 30.0, 0.5);
    let soil = SoilColumn::new(vec![layer], uniform_node_depths(5, 1.0));
    let mut cell = GridCell::new(soil, vec![1.0], &config.options);
    fill(&mut cell, 0.5, &[5.0; 5]);

    let id = TileId::new(0, 0);
    let before: CellState = cell.tile(id).unwrap().cell.clone();
    let expected_asat = ArnoSaturatedArea
        .compute_runoff_and_asat(&cell.soil, &before.layer_moist(), 0.0)
        .asat;
    let mut expected = before.clone();
    RetentionCurveWaterTable::default().compute_zwt(&cell.soil, &mut expected);

    let deriver = StateDeriver::new(config).unwrap();
    let report = deriver.derive(&mut cell).unwrap();
    assert_eq!(report.tiles_visited, 1);
    assert!(!report.has_warnings());

    let tile = cell.tile(id).unwrap();
    assert_eq!(tile.cell.asat, expected_asat);
    assert_eq!(tile.cell.zwt, expected.zwt);
    assert_eq!(tile.cell.zwt_lumped, expected.zwt);
    assert!(tile.cell.layers[0].ice.iter().all(|&i| i == 0.0));
    assert!(tile.energy.nodes.ice.iter().all(|&i| i == 0.0));
    assert!(tile.energy.nodes.kappa.iter().all(|&k| k > 0.0));
    assert!(tile.energy.nodes.cs.iter().all(|&c| c > 0.0));
    assert!(tile.energy.fronts.is_empty());
    assert!((tile.cell.layers[0].temperature - 5.0).abs() < 1e-12);
}

#[test]
fn test_crossing_profile_locates_front() {
    let config = frozen_config(1, 5);
    let layer = SoilLayer::mineral(1.0, 1500.0, 11.0, 30.0, 0.5);
    let depths = uniform_node_depths(5, 1.0);
    let soil = SoilColumn::new(vec![layer], depths.clone());
    let mut cell = GridCell::new(soil, vec![1.0], &config.options);
    // 0 °C 位于 0.375 m
    fill(&mut cell, 0.5, &linear_profile(&depths, 1.5, -4.0));

    let report = StateDeriver::new(config).unwrap().derive(&mut cell).unwrap();
    assert_eq!(report.tiles_with_fronts, 1);

    let tile = cell.tile(TileId::new(0, 0)).unwrap();
    let fronts = &tile.energy.fronts;
    assert!(fronts.freeze.is_empty());
    assert_eq!(fronts.thaw.len(), 1);
    assert!((fronts.thaw[0] - 0.375).abs() < 1e-9, "thaw = {:?}", fronts.thaw);

    // 层平均温度 -0.5 °C，层内有冰
    assert!((tile.cell.layers[0].temperature + 0.5).abs() < 1e-9);
    assert!(tile.cell.layers[0].ice[0] > 0.0);
    // 负温节点有冰，正温节点无冰
    assert_eq!(tile.energy.nodes.ice[0], 0.0);
    assert!(tile.energy.nodes.ice[4] > 0.0);
}

// ============================================================================
// 守恒与不变量
// ============================================================================

#[test]
fn test_layer_moisture_conserved_and_ice_bounded() {
    let mut config = frozen_config(2, 6);
    config.options.nfrost = 3;
    config.options.snow_band = 2;
    let soil = two_layer_column(6)
        .with_frost_areas(3, 1.0)
        .with_area_fract(vec![0.6, 0.4]);
    let mut cell = GridCell::new(soil, vec![0.3, 0.7], &config.options);
    let depths = cell.soil.node_depths.clone();
    fill(&mut cell, 0.8, &linear_profile(&depths, -6.0, 8.0));

    let ids: Vec<TileId> = cell.active_tiles().collect();
    let totals: Vec<f64> = ids
        .iter()
        .map(|&id| cell.tile(id).unwrap().cell.total_moist())
        .collect();

    let report = StateDeriver::new(config).unwrap().derive(&mut cell).unwrap();
    assert_eq!(report.tiles_visited, 4);

    for (&id, &total) in ids.iter().zip(&totals) {
        let state = &cell.tile(id).unwrap().cell;
        assert_eq!(state.total_moist(), total, "{}", id);
        for layer in &state.layers {
            for &ice in &layer.ice {
                assert!(ice >= 0.0 && ice <= layer.moist, "{}: ice {} moist {}", id, ice, layer.moist);
            }
        }
        // 表层冻结
        assert!(state.layers[0].ice.iter().any(|&i| i > 0.0));
    }
}

#[test]
fn test_node_parameters_independent_of_first_tile() {
    let config = frozen_config(2, 6);

    let mut a = GridCell::new(two_layer_column(6), vec![0.0, 0.5, 0.5], &config.options);
    let mut b = GridCell::new(two_layer_column(6), vec![0.5, 0.5, 0.0], &config.options);
    fill(&mut a, 0.4, &[2.0; 6]);
    fill(&mut b, 0.4, &[2.0; 6]);
    assert_ne!(a.active_tiles().next(), b.active_tiles().next());

    let deriver = StateDeriver::new(config).unwrap();
    let ra = deriver.derive(&mut a).unwrap();
    let rb = deriver.derive(&mut b).unwrap();
    assert_eq!(ra.node_parameter_evaluations, 1);
    assert_eq!(rb.node_parameter_evaluations, 1);

    assert_eq!(a.soil.nodes, b.soil.nodes);
    let direct = set_node_parameters(&a.soil.node_depths, &a.soil.layers, false);
    assert_eq!(a.soil.nodes, direct);
}

#[test]
fn test_stability_warning_once_per_tile() {
    let mut config = frozen_config(2, 5);
    config.options.implicit = false;
    config.options.snow_band = 2;
    config.global.dt = 1.0e7;
    let soil = two_layer_column(5).with_area_fract(vec![0.5, 0.5]);
    let mut cell = GridCell::new(soil, vec![0.5, 0.5], &config.options);
    fill(&mut cell, 0.5, &[-1.0; 5]);

    let report = StateDeriver::new(config.clone()).unwrap().derive(&mut cell).unwrap();
    assert_eq!(report.tiles_visited, 4);
    assert_eq!(report.stability_warnings.len(), 4);
    let mut tiles: Vec<(usize, usize)> = report
        .stability_warnings
        .iter()
        .map(|w| (w.veg, w.band))
        .collect();
    tiles.dedup();
    assert_eq!(tiles.len(), 4);
    assert!(report.stability_warnings.iter().all(|w| w.dt > w.dt_max));

    // 时间步长足够小时不告警；告警本身不改变状态
    let mut small = config;
    small.global.dt = 1.0;
    let mut again = cell.clone();
    let quiet = StateDeriver::new(small).unwrap().derive(&mut again).unwrap();
    assert!(quiet.stability_warnings.is_empty());
    assert_eq!(again, cell);
}

#[test]
fn test_quick_flux_and_full_profile_agree_on_uniform_profile() {
    let layers = vec![
        SoilLayer::mineral(0.1, 1500.0, 11.0, 30.0, 0.5),
        SoilLayer::mineral(0.4, 1500.0, 11.0, 30.0, 0.5),
        SoilLayer::mineral(1.0, 1500.0, 11.0, 30.0, 0.5),
    ];
    let soil = SoilColumn::new(layers, vec![0.0, 0.5, 2.0]).with_damping(4.0, -2.0);

    let mut quick = frozen_config(3, 3);
    quick.options.quick_flux = true;
    let full = frozen_config(3, 3);

    let mut cell_q = GridCell::new(soil.clone(), vec![1.0], &quick.options);
    let mut cell_f = GridCell::new(soil, vec![1.0], &full.options);
    fill(&mut cell_q, 0.7, &[-2.0; 3]);
    fill(&mut cell_f, 0.7, &[-2.0; 3]);

    let rq = StateDeriver::new(quick).unwrap().derive(&mut cell_q).unwrap();
    let rf = StateDeriver::new(full).unwrap().derive(&mut cell_f).unwrap();
    assert_eq!(rq.ice_scheme, IceContentScheme::QuickFlux);
    assert_eq!(rf.ice_scheme, IceContentScheme::FullProfile);

    let id = TileId::new(0, 0);
    let lq = &cell_q.tile(id).unwrap().cell.layers;
    let lf = &cell_f.tile(id).unwrap().cell.layers;
    for (q, f) in lq.iter().zip(lf) {
        assert!((q.temperature - f.temperature).abs() < 1e-9);
        assert!((q.ice[0] - f.ice[0]).abs() < 1e-6, "quick {} full {}", q.ice[0], f.ice[0]);
        assert!(q.ice[0] > 0.0);
    }
}

#[test]
fn test_quick_flux_and_full_profile_close_on_near_linear_profile() {
    let (dp, avg_temp) = (4.0, -2.0);
    let column = |depths: &[f64]| {
        let layers = vec![
            SoilLayer::mineral(0.1, 1500.0, 11.0, 30.0, 0.5),
            SoilLayer::mineral(0.3, 1500.0, 11.0, 30.0, 0.5),
            SoilLayer::mineral(0.6, 1500.0, 11.0, 30.0, 0.5),
        ];
        SoilColumn::new(layers, depths.to_vec())
            .with_frost_areas(3, 2.0)
            .with_damping(dp, avg_temp)
    };
    // 第二节点以下按阻尼剖面取样，整体接近线性
    let t1 = -4.5;
    let profile = |depths: &[f64]| {
        let mut temps = vec![-5.0];
        temps.extend(
            depths[1..]
                .iter()
                .map(|&z| avg_temp + (t1 - avg_temp) * (-(z - 0.1) / dp).exp()),
        );
        temps
    };

    let quick_depths = [0.0, 0.1, 1.0];
    let full_depths = [0.0, 0.1, 0.4, 1.0];

    let mut quick = frozen_config(3, 3);
    quick.options.quick_flux = true;
    quick.options.nfrost = 3;
    let mut full = frozen_config(3, 4);
    full.options.nfrost = 3;

    let mut cell_q = GridCell::new(column(&quick_depths), vec![1.0], &quick.options);
    let mut cell_f = GridCell::new(column(&full_depths), vec![1.0], &full.options);
    fill(&mut cell_q, 0.6, &profile(&quick_depths));
    fill(&mut cell_f, 0.6, &profile(&full_depths));

    StateDeriver::new(quick).unwrap().derive(&mut cell_q).unwrap();
    StateDeriver::new(full).unwrap().derive(&mut cell_f).unwrap();

    let id = TileId::new(0, 0);
    let lq = &cell_q.tile(id).unwrap().cell.layers;
    let lf = &cell_f.tile(id).unwrap().cell.layers;
    // 表层两方案都取前两节点均值
    assert!((lq[0].temperature - lf[0].temperature).abs() < 1e-12);
    for (q, f) in lq.iter().zip(lf) {
        assert!(
            (q.temperature - f.temperature).abs() < 1e-2,
            "quick {} full {}",
            q.temperature,
            f.temperature
        );
        for (qi, fi) in q.ice.iter().zip(&f.ice) {
            assert!(*qi > 0.0);
            assert!((qi - fi).abs() < 1e-3 * q.moist, "quick {} full {}", qi, fi);
        }
    }
}

#[test]
fn test_full_energy_without_frozen_soil_distributes_unfrozen_nodes() {
    let mut config = ModelConfig::default();
    config.options.full_energy = true;
    config.options.nlayer = 2;
    let mut cell = GridCell::new(two_layer_column(3), vec![1.0], &config.options);
    fill(&mut cell, 0.5, &[-3.0; 3]);

    let id = TileId::new(0, 0);
    {
        let tile = cell.tile_mut(id).unwrap();
        tile.energy.nodes.kappa = vec![9.9; 3];
        tile.energy.nodes.ice = vec![0.1; 3];
        for layer in &mut tile.cell.layers {
            layer.ice = vec![4.0; layer.ice.len()];
        }
    }

    let report = StateDeriver::new(config).unwrap().derive(&mut cell).unwrap();
    assert_eq!(report.tiles_visited, 1);
    assert_eq!(report.tiles_with_fronts, 0);
    assert!(!report.has_warnings());

    let tile = cell.tile(id).unwrap();
    let nodes = &tile.energy.nodes;
    assert!(nodes.ice.iter().all(|&i| i == 0.0), "{:?}", nodes.ice);
    assert!(nodes.moist.iter().all(|&m| m > 0.0));
    assert!(nodes.kappa.iter().all(|&k| k > 0.0 && k < 5.0), "{:?}", nodes.kappa);
    assert!(nodes.cs.iter().all(|&c| c > 0.0));
    assert!(tile.energy.fronts.is_empty());
    assert!(tile.cell.layers.iter().all(|l| l.ice.iter().all(|&i| i == 0.0)));
}

#[test]
fn test_node_fields_untouched_without_node_moisture() {
    let mut config = ModelConfig::default();
    config.options.nlayer = 2;
    let mut cell = GridCell::new(two_layer_column(3), vec![1.0], &config.options);
    fill(&mut cell, 0.5, &[-3.0; 3]);

    let id = TileId::new(0, 0);
    {
        let nodes = &mut cell.tile_mut(id).unwrap().energy.nodes;
        nodes.moist = vec![0.33; 3];
        nodes.ice = vec![0.07; 3];
        nodes.kappa = vec![9.9; 3];
    }
    let checkpoint = cell.tile(id).unwrap().energy.nodes.clone();

    let deriver = StateDeriver::new(config).unwrap();
    assert_eq!(deriver.plan().node_moisture, NodeMoistureMode::Skip);
    let report = deriver.derive(&mut cell).unwrap();
    assert_eq!(report.tiles_visited, 1);

    assert_eq!(cell.tile(id).unwrap().energy.nodes, checkpoint);
}

#[test]
fn test_fronts_only_when_frost_active_and_full_profile() {
    let depths = uniform_node_depths(5, 1.0);
    let temps = linear_profile(&depths, 1.5, -4.0);

    // 土柱不可冻结：无锋面、无冰
    let config = frozen_config(2, 5);
    let mut soil = two_layer_column(5);
    soil.fs_active = false;
    let mut cell = GridCell::new(soil, vec![1.0], &config.options);
    fill(&mut cell, 0.5, &temps);
    let report = StateDeriver::new(config).unwrap().derive(&mut cell).unwrap();
    assert_eq!(report.tiles_with_fronts, 0);
    let tile = cell.tile(TileId::new(0, 0)).unwrap();
    assert!(tile.energy.fronts.is_empty());
    assert!(tile.cell.layers.iter().all(|l| l.ice.iter().all(|&i| i == 0.0)));

    // 快速通量：锋面字段保持原值
    let mut quick = frozen_config(2, 3);
    quick.options.quick_flux = true;
    let soil = SoilColumn::new(two_layer_column(3).layers, vec![0.0, 0.5, 1.0]);
    let mut cell = GridCell::new(soil, vec![1.0], &quick.options);
    fill(&mut cell, 0.5, &[1.0, -1.0, -2.0]);
    let report = StateDeriver::new(quick).unwrap().derive(&mut cell).unwrap();
    assert_eq!(report.tiles_with_fronts, 0);
    assert!(cell.tile(TileId::new(0, 0)).unwrap().energy.fronts.is_empty());
}

// ============================================================================
// 退化瓦片
// ============================================================================

struct CountingSaturatedArea {
    calls: Arc<AtomicUsize>,
}

impl SaturatedAreaEstimator for CountingSaturatedArea {
    fn name(&self) -> &'static str {
        "counting"
    }

    fn compute_runoff_and_asat(&self, _column: &SoilColumn, _moist: &[f64], inflow: f64) -> SaturatedArea {
        self.calls.fetch_add(1, Ordering::SeqCst);
        assert_eq!(inflow, 0.0);
        SaturatedArea { asat: 0.42, runoff: 0.0 }
    }
}

struct CountingWaterTable {
    calls: Arc<AtomicUsize>,
}

impl WaterTableEstimator for CountingWaterTable {
    fn name(&self) -> &'static str {
        "counting"
    }

    fn compute_zwt(&self, _column: &SoilColumn, cell: &mut CellState) {
        self.calls.fetch_add(1, Ordering::SeqCst);
        cell.zwt = 0.9;
        cell.zwt_lumped = 0.9;
    }
}

#[test]
fn test_degenerate_tiles_never_visited() {
    let mut config = frozen_config(2, 5);
    config.options.snow_band = 3;
    let soil = two_layer_column(5).with_area_fract(vec![0.7, 0.0, 0.3]);
    let mut cell = GridCell::new(soil, vec![0.5, 0.0, 0.5], &config.options);
    fill(&mut cell, 0.5, &[3.0; 5]);

    let asat_calls = Arc::new(AtomicUsize::new(0));
    let zwt_calls = Arc::new(AtomicUsize::new(0));
    let deriver = StateDeriver::builder(config)
        .saturated_area(CountingSaturatedArea { calls: asat_calls.clone() })
        .water_table(CountingWaterTable { calls: zwt_calls.clone() })
        .build()
        .unwrap();

    let report = deriver.derive(&mut cell).unwrap();
    assert_eq!(report.tiles_visited, 4);
    assert_eq!(asat_calls.load(Ordering::SeqCst), 4);
    assert_eq!(zwt_calls.load(Ordering::SeqCst), 4);

    for veg in 0..3 {
        for band in 0..3 {
            let id = TileId::new(veg, band);
            let tile = cell.tile(id).unwrap();
            if veg == 1 || band == 1 {
                assert_eq!(tile.cell.asat, 0.0, "{}", id);
                assert_eq!(tile.cell.zwt, 0.0, "{}", id);
                assert!(tile.energy.nodes.kappa.iter().all(|&k| k == 0.0), "{}", id);
            } else {
                assert_eq!(tile.cell.asat, 0.42, "{}", id);
                assert_eq!(tile.cell.zwt, 0.9, "{}", id);
            }
        }
    }
}

// ============================================================================
// 错误路径
// ============================================================================

#[test]
fn test_supersaturated_node_is_fatal_with_routine() {
    let mut config = frozen_config(2, 5);
    config.options.snow_band = 2;
    let soil = two_layer_column(5).with_area_fract(vec![0.5, 0.5]);
    let mut cell = GridCell::new(soil, vec![1.0], &config.options);
    fill(&mut cell, 0.5, &[1.0; 5]);
    let max = cell.soil.layers[1].max_moist;
    cell.tile_mut(TileId::new(0, 1)).unwrap().cell.layers[1].moist = 1.2 * max;

    let err = StateDeriver::new(config).unwrap().derive(&mut cell).unwrap_err();
    assert_eq!(err.routine(), Some("distribute_node_moisture_properties"));
    match err {
        PhysicsError::Routine { veg, band, source, .. } => {
            assert_eq!((veg, band), (0, 1));
            assert!(matches!(*source, PhysicsError::NodeMoistureExceedsMax { .. }));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_ice_estimation_error_names_routine() {
    // 完整能量平衡与冻土都关闭时只有层含冰量估算会报告非物理输入
    let mut config = ModelConfig::default();
    config.options.nlayer = 2;
    let soil = SoilColumn::new(two_layer_column(3).layers, vec![0.0, 0.5, 1.0]);
    let mut cell = GridCell::new(soil, vec![1.0], &config.options);
    fill(&mut cell, 0.5, &[1.0; 3]);
    cell.tile_mut(TileId::new(0, 0)).unwrap().cell.layers[0].moist = -3.0;

    let err = StateDeriver::new(config).unwrap().derive(&mut cell).unwrap_err();
    assert_eq!(err.routine(), Some("estimate_layer_ice_content_quick_flux"));
}

#[test]
fn test_shape_mismatch_rejected_up_front() {
    let config = frozen_config(2, 5);
    let mut cell = GridCell::new(two_layer_column(4), vec![1.0], &config.options);
    fill(&mut cell, 0.5, &[1.0; 5]);
    let err = StateDeriver::new(config).unwrap().derive(&mut cell).unwrap_err();
    assert!(matches!(err, PhysicsError::Foundation(ref e) if e.is_shape_error()));
}
