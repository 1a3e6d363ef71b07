//! # TestGrid — headless harness for utility network tests
//!
//! Wraps a `bevy::app::App` with `MinimalPlugins` + `UtilityGridPlugin` so a
//! test can place structures, drive `FixedUpdate` tick by tick and inspect the
//! resulting components, pools and events.

mod placing;
mod queries;

use bevy::app::App;
use bevy::prelude::*;

use crate::capabilities::{Terrain, TerrainProvider};
use crate::config::{UtilityParams, GRID_HEIGHT, GRID_WIDTH, MAX_PLAYERS};
use crate::network::NetworkState;
use crate::network_kind::{Energy, Fluid};
use crate::UtilityGridPlugin;

pub struct TestGrid {
    app: App,
}

impl Default for TestGrid {
    fn default() -> Self {
        Self::new()
    }
}

impl TestGrid {
    /// Full-size map with the default player count.
    pub fn new() -> Self {
        Self::with_size(GRID_WIDTH, GRID_HEIGHT, MAX_PLAYERS)
    }

    /// A smaller map keeps flood fills and digests cheap in tests.
    pub fn with_size(width: usize, height: usize, max_players: u8) -> Self {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins);

        // Insert sized network state BEFORE the plugin; init_resource keeps it.
        app.insert_resource(NetworkState::<Energy>::new(width, height, max_players));
        app.insert_resource(NetworkState::<Fluid>::new(width, height, max_players));
        app.add_plugins(UtilityGridPlugin);

        Self { app }
    }

    pub fn with_params(mut self, params: UtilityParams) -> Self {
        self.app.insert_resource(params);
        self
    }

    pub fn with_terrain(mut self, provider: impl TerrainProvider) -> Self {
        self.app.insert_resource(Terrain::new(provider));
        self
    }

    /// Run N fixed-update ticks by executing the `FixedUpdate` schedule
    /// directly, bypassing virtual time.
    pub fn tick(&mut self, n: u32) {
        for _ in 0..n {
            self.app.world_mut().run_schedule(FixedUpdate);
        }
    }

    pub fn world(&self) -> &World {
        self.app.world()
    }

    pub fn world_mut(&mut self) -> &mut World {
        self.app.world_mut()
    }

    pub fn resource<R: Resource>(&self) -> &R {
        self.app.world().resource::<R>()
    }

    pub fn resource_mut<R: Resource>(&mut self) -> Mut<'_, R> {
        self.app.world_mut().resource_mut::<R>()
    }
}
