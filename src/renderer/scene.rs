//! Scene composition
//!
//! Each entity renders itself as simple shapes; `render` layers the whole
//! `GameState` in draw order onto any `Surface`.

use glam::Vec2;

use super::surface::{Surface, with_alpha};
use super::vertex::colors;
use crate::consts::*;
use crate::sim::chaos::ChaosEffectKind;
use crate::sim::enemy::Behavior;
use crate::sim::fx::{FloatingText, Ghost, GroundHole, Particle, ParticleKind, Portal, Scenery, SceneryKind, TextStyle};
use crate::sim::{
    Bullet, BulletKind, Enemy, EnemyBullet, EnemyBulletKind, EnemyKind, GameState, Player, Powerup, PowerupEffect,
    TroopCarrier,
};

/// Something that can draw itself
pub trait Render {
    fn render(&self, surface: &mut dyn Surface);
}

impl Render for Player {
    fn render(&self, s: &mut dyn Surface) {
        let color = if self.invincible {
            colors::PLAYER_INVINCIBLE
        } else {
            colors::PLAYER
        };
        let center = self.center();

        s.save();
        s.translate(center);
        s.rotate(self.rotation);
        s.fill_rect(-self.size / 2.0, self.size, color);
        // Barrel
        s.fill_rect(Vec2::new(self.size.x / 2.0, -2.0), Vec2::new(6.0, 4.0), colors::WHITE);
        s.restore();

        if self.has(PowerupEffect::Shield) {
            s.fill_circle(center, self.size.y, colors::PLAYER_SHIELD);
        }
    }
}

fn enemy_color(kind: EnemyKind) -> [f32; 4] {
    match kind {
        EnemyKind::Grunt => [1.0, 0.27, 0.27, 1.0],
        EnemyKind::Fast => [1.0, 0.53, 0.0, 1.0],
        EnemyKind::Heavy => [0.53, 0.0, 0.0, 1.0],
        EnemyKind::Exploder => [1.0, 0.0, 1.0, 1.0],
        EnemyKind::Teleporter => [0.0, 1.0, 1.0, 1.0],
        EnemyKind::Flyer => [0.53, 0.53, 1.0, 1.0],
        EnemyKind::Shield => [0.27, 0.27, 1.0, 1.0],
        EnemyKind::Spinner => [1.0, 1.0, 0.27, 1.0],
        EnemyKind::Mutant | EnemyKind::Glitcher => [0.6, 0.6, 0.6, 1.0],
    }
}

impl Render for Enemy {
    fn render(&self, s: &mut dyn Surface) {
        let center = self.center();
        let rotation = match self.behavior {
            Behavior::Spin { rotation, .. } => rotation,
            _ => 0.0,
        };

        s.save();
        if self.is_protected() {
            s.set_alpha(0.5);
        }
        s.translate(center);
        s.rotate(rotation);
        s.fill_rect(-self.size / 2.0, self.size, enemy_color(self.kind));
        s.restore();

        if self.is_shielded() {
            s.fill_circle(center, self.size.x * 0.8, colors::ENEMY_SHIELD);
        }

        if self.hp < self.max_hp && self.max_hp > 0 {
            let bar = Vec2::new(self.size.x, 2.0);
            let top = self.pos - Vec2::new(0.0, 5.0);
            let frac = (self.hp.max(0) as f32) / self.max_hp as f32;
            s.fill_rect(top, bar, colors::HP_BACK);
            s.fill_rect(top, Vec2::new(bar.x * frac, bar.y), colors::HP_FRONT);
        }
    }
}

impl Render for Bullet {
    fn render(&self, s: &mut dyn Surface) {
        let color = if self.explosive {
            colors::EXPLOSIVE
        } else {
            match self.kind {
                BulletKind::Basic => colors::BULLET,
                BulletKind::Laser => colors::LASER,
                BulletKind::Chaos { .. } => colors::CHAOS_BULLET,
                BulletKind::BigBoy { .. } => colors::BIG_BOY,
            }
        };
        if self.is_big_boy() {
            s.fill_ellipse(self.pos + self.size / 2.0, self.size / 2.0, color);
        } else {
            s.fill_rect(self.pos, self.size, color);
        }
    }
}

impl Render for EnemyBullet {
    fn render(&self, s: &mut dyn Surface) {
        match self.kind {
            EnemyBulletKind::Bomb => s.fill_circle(self.pos + self.size / 2.0, self.size.x / 2.0, colors::BOMB),
            _ => s.fill_rect(self.pos, self.size, colors::ENEMY_BULLET),
        }
    }
}

impl Render for Powerup {
    fn render(&self, s: &mut dyn Surface) {
        let hue = (self.kind as u8 as f32 * 0.37).fract();
        let color = [1.0 - hue, 0.5 + hue / 2.0, hue, 1.0];
        s.fill_circle(self.pos + self.size / 2.0, self.size.x / 2.0, color);
        s.fill_text(self.label.text, self.label.pos, 8.0, colors::WHITE);
    }
}

impl Render for TroopCarrier {
    fn render(&self, s: &mut dyn Surface) {
        s.fill_rect(self.pos, self.size, colors::CARRIER);

        let wheel_y = self.pos.y + self.size.y;
        for i in 0..3 {
            let x = self.pos.x + 10.0 + i as f32 * 20.0;
            s.save();
            s.translate(Vec2::new(x, wheel_y));
            s.rotate(self.wheel_offset);
            s.fill_circle(Vec2::ZERO, 5.0, colors::WHEEL);
            s.fill_rect(Vec2::new(-1.0, -5.0), Vec2::new(2.0, 4.0), colors::ROCK);
            s.restore();
        }

        let top = self.pos - Vec2::new(0.0, 8.0);
        let frac = (self.hp.max(0) as f32) / self.max_hp as f32;
        s.fill_rect(top, Vec2::new(self.size.x, 3.0), colors::HP_BACK);
        s.fill_rect(top, Vec2::new(self.size.x * frac, 3.0), colors::HP_FRONT);
    }
}

impl Render for Portal {
    fn render(&self, s: &mut dyn Surface) {
        let pulse = 1.0 + (self.anim_ticks as f32 * 0.1).sin() * 0.1;
        s.save();
        s.set_alpha(self.fade());
        s.translate(self.center());
        s.rotate(self.anim_ticks as f32 * 0.05);
        s.fill_ellipse(Vec2::ZERO, Vec2::new(Portal::SIZE / 2.0, Portal::SIZE / 3.0) * pulse, colors::PORTAL);
        s.restore();
    }
}

impl Render for GroundHole {
    fn render(&self, s: &mut dyn Surface) {
        s.fill_rect(self.pos, self.size, colors::LAVA);
        let glow = 0.5 + (self.anim_time * 3.0).sin() * 0.3;
        s.fill_rect(self.pos, Vec2::new(self.size.x, 3.0), with_alpha(colors::LAVA_GLOW, glow));
    }
}

impl Render for Scenery {
    fn render(&self, s: &mut dyn Surface) {
        match self.kind {
            SceneryKind::Tree => {
                s.fill_rect(self.pos, Vec2::new(6.0, 20.0), colors::TREE_TRUNK);
                s.fill_circle(self.pos + Vec2::new(3.0, -4.0), 10.0, colors::TREE_LEAVES);
            }
            SceneryKind::Rock => s.fill_ellipse(self.pos, Vec2::new(8.0, 5.0), colors::ROCK),
        }
    }
}

fn particle_color(kind: ParticleKind) -> [f32; 4] {
    match kind {
        ParticleKind::Hit | ParticleKind::BulletSpark => [1.0, 1.0, 0.4, 1.0],
        ParticleKind::Nuke | ParticleKind::Explosion => [1.0, 0.5, 0.0, 1.0],
        ParticleKind::BulletClash => [1.0, 1.0, 1.0, 1.0],
        ParticleKind::ShieldHit => [0.3, 0.7, 1.0, 1.0],
        ParticleKind::PortalWarp => [0.7, 0.3, 1.0, 1.0],
        ParticleKind::Powerup => [0.3, 1.0, 0.3, 1.0],
    }
}

impl Render for Particle {
    fn render(&self, s: &mut dyn Surface) {
        s.fill_rect(self.pos, Vec2::splat(self.size), with_alpha(particle_color(self.kind), self.fade()));
    }
}

fn text_color(style: TextStyle) -> [f32; 4] {
    match style {
        TextStyle::Collected => [1.0, 1.0, 0.0, 1.0],
        TextStyle::ChaosLevel => [1.0, 0.0, 0.27, 1.0],
        TextStyle::ChaosDescription => [1.0, 0.53, 0.0, 1.0],
        TextStyle::Debug => [0.0, 1.0, 1.0, 1.0],
        TextStyle::ShieldDamage => [0.27, 0.53, 1.0, 1.0],
        TextStyle::ShieldRepair => [0.0, 1.0, 0.53, 1.0],
        TextStyle::WeaponName => [1.0, 0.84, 0.0, 1.0],
        TextStyle::Damage => [1.0, 1.0, 1.0, 1.0],
    }
}

impl Render for FloatingText {
    fn render(&self, s: &mut dyn Surface) {
        let color = with_alpha(text_color(self.style), self.fade());
        s.fill_text(&self.text, self.pos, self.style.font_size(), color);
    }
}

impl Render for Ghost {
    fn render(&self, s: &mut dyn Surface) {
        let sway = (self.oscillation).sin() * 2.0;
        s.save();
        s.set_alpha(self.alpha());
        s.fill_ellipse(self.pos + Vec2::new(sway, 0.0), Vec2::new(Ghost::SIZE / 2.0, Ghost::SIZE / 1.6), colors::GHOST);
        s.restore();
    }
}

fn render_all<T: Render>(items: &[T], s: &mut dyn Surface) {
    for item in items {
        item.render(s);
    }
}

/// Draw one frame of `state`.
///
/// The world layer is offset by the chaos shake; overlays (red pulse and
/// flash) and floating texts are drawn unshaken on top.
pub fn render(state: &GameState, s: &mut dyn Surface) {
    let playfield = Vec2::new(PLAYFIELD_WIDTH, PLAYFIELD_HEIGHT);
    s.fill_rect(Vec2::ZERO, playfield, colors::BACKGROUND);

    s.save();
    s.translate(state.chaos.shake_offset);

    render_all(&state.scenery, s);
    s.fill_rect(
        Vec2::new(0.0, GROUND_Y),
        Vec2::new(PLAYFIELD_WIDTH, PLAYFIELD_HEIGHT - GROUND_Y),
        colors::GROUND,
    );
    render_all(&state.ground_holes, s);
    render_all(&state.portals, s);
    render_all(&state.powerups, s);
    render_all(&state.carriers, s);
    render_all(&state.enemies, s);
    render_all(&state.bullets, s);
    render_all(&state.enemy_bullets, s);
    state.player.render(s);
    render_all(&state.fx.particles, s);
    render_all(&state.fx.ghosts, s);

    s.restore();

    render_all(&state.fx.texts, s);

    if state.chaos.has(ChaosEffectKind::ColorInvert) {
        let t = state.frame as f32 * FRAME_DT;
        let alpha = 0.1 + (t * 10.0).sin().abs() * 0.1;
        s.fill_rect(Vec2::ZERO, playfield, with_alpha(colors::RED_OVERLAY, alpha));
    }

    if let Some(flash) = state.chaos.flash {
        s.fill_rect(Vec2::ZERO, playfield, with_alpha(colors::WHITE, flash.alpha().min(1.0)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::batch::VertexBatch;

    fn frame(state: &GameState) -> VertexBatch {
        let mut batch = VertexBatch::new();
        render(state, &mut batch);
        batch
    }

    #[test]
    fn test_render_fresh_state() {
        let state = GameState::new(1);
        let batch = frame(&state);
        assert!(batch.triangle_count() > 2);
        assert!(batch.texts.is_empty());
        // Background spans the playfield
        assert_eq!(batch.vertices[2].position, [PLAYFIELD_WIDTH, PLAYFIELD_HEIGHT]);
    }

    #[test]
    fn test_shake_offsets_world_but_not_texts() {
        let mut state = GameState::new(1);
        state.fx.text(Vec2::new(400.0, 100.0), "HELLO", TextStyle::Debug);
        let still = frame(&state);

        state.chaos.shake_offset = Vec2::new(3.0, -2.0);
        let shaken = frame(&state);

        // Background is drawn before the shake transform
        assert_eq!(still.vertices[0], shaken.vertices[0]);
        assert_eq!(still.vertices.len(), shaken.vertices.len());
        assert_eq!(still.texts[0].pos, shaken.texts[0].pos);
        let world_shift = shaken
            .vertices
            .iter()
            .zip(&still.vertices)
            .any(|(a, b)| a.position[0] - b.position[0] == 3.0);
        assert!(world_shift);
    }

    #[test]
    fn test_color_invert_adds_overlay() {
        let mut state = GameState::new(2);
        let base = frame(&state).triangle_count();
        state.chaos.push(ChaosEffectKind::ColorInvert, 100, 1.0);
        let with_overlay = frame(&state);
        assert_eq!(with_overlay.triangle_count(), base + 2);
        let last = with_overlay.vertices.last().map(|v| v.color);
        assert!(matches!(last, Some(c) if c[0] == 1.0 && c[1] == 0.0 && c[3] < 1.0));
    }

    #[test]
    fn test_flash_overlay_fades() {
        let mut state = GameState::new(3);
        state.chaos.flash(30, 1.0);
        let batch = frame(&state);
        let alpha = batch.vertices.last().map(|v| v.color[3]).unwrap_or_default();
        assert!(alpha > 0.0 && alpha <= 0.5);
    }

    #[test]
    fn test_protected_enemy_drawn_translucent() {
        let mut state = GameState::new(4);
        let enemy = Enemy::new(400.0, EnemyKind::Grunt, 1, None, &mut state.rng);
        assert!(enemy.is_protected());

        let mut batch = VertexBatch::new();
        enemy.render(&mut batch);
        assert_eq!(batch.vertices[0].color[3], 0.5);
    }
}
