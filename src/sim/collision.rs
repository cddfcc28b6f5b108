//! Collision scheduling
//!
//! Instead of sweeping boxes every frame, the scheduler solves for the
//! first future instant at which the falling hero meets a cloud, builds the
//! hero's post-contact trajectory, and hands back a single
//! `PendingCollision`. The step loop fires it once its time arrives without
//! re-checking the path in between.
//!
//! Three contacts are predicted per cloud:
//! - Landing: bottom edge reaches the cloud's top while descending
//! - Underside: top edge reaches the cloud's bottom while ascending
//! - Side: a vertical edge reaches the facing cloud edge while closing in

use std::cmp::Ordering;

use glam::DVec2;

use super::roots::{Horizon, edge_crossings};
use super::state::{Cloud, ContactKind, Hero, Locomotion, PendingCollision};
use super::trajectory::{Edge, Trajectory};
use crate::config::Config;
use crate::error::ContractViolation;

/// Earliest collision of the hero with any cloud, if one lies within the horizon
///
/// Only a falling hero is scheduled. Ties on time go to the lower cloud id,
/// then to the contact kind (landing first).
pub fn schedule(
    hero: &Hero,
    clouds: &[Cloud],
    now: f64,
    config: &Config,
) -> Result<Option<PendingCollision>, ContractViolation> {
    if hero.is_dead || hero.locomotion != Locomotion::Falling {
        return Ok(None);
    }

    let horizon = Horizon::for_config(now, config);
    let mut best: Option<PendingCollision> = None;

    for cloud in clouds {
        let candidates = [
            landing(&hero.trajectory, cloud, &horizon, config)?,
            underside(&hero.trajectory, cloud, &horizon, config)?,
            side(&hero.trajectory, cloud, &horizon, config)?,
        ];
        for candidate in candidates.into_iter().flatten() {
            if best
                .as_ref()
                .is_none_or(|b| precedence(&candidate, b) == Ordering::Less)
            {
                best = Some(candidate);
            }
        }
    }

    if let Some(ref hit) = best {
        log::debug!(
            "Scheduled {:?} on cloud {:?} at t={:.2} (now {})",
            hit.kind,
            hit.cloud_id,
            hit.time,
            now
        );
    }
    Ok(best)
}

/// Ordering of candidates: time, then cloud id, then kind
fn precedence(a: &PendingCollision, b: &PendingCollision) -> Ordering {
    a.time
        .total_cmp(&b.time)
        .then_with(|| a.cloud_id.cmp(&b.cloud_id))
        .then_with(|| a.kind.cmp(&b.kind))
}

/// Hero lands on top of the cloud and rides it
fn landing(
    hero: &Trajectory,
    cloud: &Cloud,
    horizon: &Horizon,
    config: &Config,
) -> Result<Option<PendingCollision>, ContractViolation> {
    let times = edge_crossings(hero, Edge::Bottom, &cloud.trajectory, Edge::Top, horizon, config)?;
    for t in times {
        // Crossing the top edge upward means we came through from below
        if hero.velocity_at(t).y <= 0.0 {
            continue;
        }
        let hero_box = hero.evaluate(t)?;
        let cloud_box = cloud.box_at(t)?;
        if !hero_box.overlaps_x(&cloud_box) {
            continue;
        }

        let landed = hero_box.with_bottom_at(cloud_box.y0);
        return Ok(Some(PendingCollision {
            time: t,
            trajectory: Trajectory::standing(landed, config.scroll_speed, t)?,
            locomotion: Locomotion::Standing,
            cloud_id: Some(cloud.id),
            kind: ContactKind::Landing,
        }));
    }
    Ok(None)
}

/// Hero bumps its head and the vertical velocity flips
fn underside(
    hero: &Trajectory,
    cloud: &Cloud,
    horizon: &Horizon,
    config: &Config,
) -> Result<Option<PendingCollision>, ContractViolation> {
    let times = edge_crossings(hero, Edge::Top, &cloud.trajectory, Edge::Bottom, horizon, config)?;
    for t in times {
        let velocity = hero.velocity_at(t);
        if velocity.y >= 0.0 {
            continue;
        }
        let hero_box = hero.evaluate(t)?;
        let cloud_box = cloud.box_at(t)?;
        if !hero_box.overlaps_x(&cloud_box) {
            continue;
        }

        let rebound = Trajectory::falling(
            hero_box.with_top_at(cloud_box.y1),
            DVec2::new(velocity.x, -velocity.y),
            hero.params().acceleration,
            t,
        )?;
        return Ok(Some(PendingCollision {
            time: t,
            trajectory: rebound,
            locomotion: Locomotion::Falling,
            cloud_id: Some(cloud.id),
            kind: ContactKind::Underside,
        }));
    }
    Ok(None)
}

/// Hero hits the cloud's left or right edge and bounces off it
///
/// The bounce reflects the velocity relative to the drifting cloud.
fn side(
    hero: &Trajectory,
    cloud: &Cloud,
    horizon: &Horizon,
    config: &Config,
) -> Result<Option<PendingCollision>, ContractViolation> {
    let cloud_vx = cloud.trajectory.params().velocity.x;
    let mut earliest: Option<PendingCollision> = None;

    // (hero edge, cloud edge, sign of closing relative speed)
    let faces = [(Edge::Right, Edge::Left, 1.0), (Edge::Left, Edge::Right, -1.0)];

    for (hero_edge, cloud_edge, closing) in faces {
        let times = edge_crossings(hero, hero_edge, &cloud.trajectory, cloud_edge, horizon, config)?;
        for t in times {
            let velocity = hero.velocity_at(t);
            if (velocity.x - cloud_vx) * closing <= 0.0 {
                continue;
            }
            let hero_box = hero.evaluate(t)?;
            let cloud_box = cloud.box_at(t)?;
            if !hero_box.overlaps_y(&cloud_box) {
                continue;
            }

            let contact = match hero_edge {
                Edge::Right => hero_box.with_right_at(cloud_box.x0),
                _ => hero_box.with_left_at(cloud_box.x1),
            };
            let rebound = Trajectory::falling(
                contact,
                DVec2::new(2.0 * cloud_vx - velocity.x, velocity.y),
                hero.params().acceleration,
                t,
            )?;
            if earliest.as_ref().is_none_or(|e| t < e.time) {
                earliest = Some(PendingCollision {
                    time: t,
                    trajectory: rebound,
                    locomotion: Locomotion::Falling,
                    cloud_id: Some(cloud.id),
                    kind: ContactKind::Side,
                });
            }
            break;
        }
    }
    Ok(earliest)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RootSolver;
    use crate::sim::Aabb;

    const CLOUD_SIZE: DVec2 = DVec2::new(140.0, 33.0);

    fn falling_hero(x0: f64, y0: f64, velocity: DVec2, gravity: f64) -> Hero {
        let config = Config::default();
        let mut hero = Hero::new(&config).unwrap();
        let origin = Aabb::from_min_size(DVec2::new(x0, y0), DVec2::splat(32.0));
        let trajectory =
            Trajectory::falling(origin, velocity, DVec2::new(0.0, gravity), 0.0).unwrap();
        hero.replace_trajectory(trajectory, Locomotion::Falling);
        hero
    }

    fn cloud(id: u32, right_bound: f64, top: f64) -> Cloud {
        Cloud {
            id,
            trajectory: Trajectory::cloud_drift(right_bound, top, CLOUD_SIZE, 1.4, 0.0).unwrap(),
        }
    }

    #[test]
    fn test_no_clouds_no_collision() {
        let hero = falling_hero(300.0, 100.0, DVec2::ZERO, 0.2);
        let result = schedule(&hero, &[], 0.0, &Config::default()).unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_only_falling_hero_is_scheduled() {
        let config = Config::default();
        let flying = Hero::new(&config).unwrap();
        let under = cloud(0, 0.0, flying.box_at(0.0).unwrap().y1 + 20.0);
        assert!(schedule(&flying, &[under], 0.0, &config).unwrap().is_none());
    }

    #[test]
    fn test_landing_on_cloud_below() {
        let config = Config::default();
        let hero = falling_hero(300.0, 100.0, DVec2::ZERO, 0.2);
        let platform = cloud(3, 300.0, 200.0);

        let hit = schedule(&hero, &[platform], 0.0, &config).unwrap().unwrap();
        // 132 + 0.1 t² = 200
        assert!((hit.time - 680f64.sqrt()).abs() < 1e-9);
        assert_eq!(hit.kind, ContactKind::Landing);
        assert_eq!(hit.locomotion, Locomotion::Standing);
        assert_eq!(hit.cloud_id, Some(3));

        // No jump at the hand-off
        let before = hero.trajectory.evaluate(hit.time).unwrap();
        let after = hit.trajectory.evaluate(hit.time).unwrap();
        assert!(before.approx_eq(&after, 1e-6));
        // Rides the cloud afterwards
        let later = hit.trajectory.evaluate(hit.time + 10.0).unwrap();
        assert!((later.x0 - (after.x0 - 14.0)).abs() < 1e-9);
        assert_eq!(later.y1, 200.0);
    }

    #[test]
    fn test_vertical_alignment_alone_is_not_enough() {
        let config = Config::default();
        let hero = falling_hero(600.0, 100.0, DVec2::ZERO, 0.2);
        // Cloud already far to the left of the hero
        let platform = cloud(0, 100.0, 200.0);
        assert!(schedule(&hero, &[platform], 0.0, &config).unwrap().is_none());
    }

    #[test]
    fn test_earliest_cloud_wins_and_ties_go_to_lower_id() {
        let config = Config::default();
        let hero = falling_hero(300.0, 100.0, DVec2::ZERO, 0.2);

        let low = cloud(1, 300.0, 300.0);
        let high = cloud(2, 300.0, 200.0);
        let hit = schedule(&hero, &[low, high.clone()], 0.0, &config).unwrap().unwrap();
        assert_eq!(hit.cloud_id, Some(2));

        let twin = Cloud { id: 0, ..high.clone() };
        let hit = schedule(&hero, &[high, twin], 0.0, &config).unwrap().unwrap();
        assert_eq!(hit.cloud_id, Some(0));
    }

    #[test]
    fn test_underside_rebound_flips_vertical_velocity() {
        let config = Config::default();
        // Below the cloud, jumping up into it
        let hero = falling_hero(300.0, 300.0, DVec2::new(0.0, -10.0), 0.2);
        let platform = cloud(5, 300.0, 200.0);

        let hit = schedule(&hero, &[platform], 0.0, &config).unwrap().unwrap();
        assert_eq!(hit.kind, ContactKind::Underside);
        assert_eq!(hit.locomotion, Locomotion::Falling);
        // 300 - 10 t + 0.1 t² = 233
        let expected = (10.0 - (100.0f64 - 26.8).sqrt()) / 0.2;
        assert!((hit.time - expected).abs() < 1e-9);

        let v_before = hero.trajectory.velocity_at(hit.time);
        let v_after = hit.trajectory.params().velocity;
        assert!((v_after.y + v_before.y).abs() < 1e-9);
        assert!(v_after.y > 0.0);
        let b = hit.trajectory.evaluate(hit.time).unwrap();
        assert!((b.y0 - 233.0).abs() < 1e-9);
    }

    #[test]
    fn test_side_rebound_reflects_relative_velocity() {
        let config = Config::default();
        let hero = falling_hero(100.0, 190.0, DVec2::new(3.0, 0.0), 0.0);
        let platform = cloud(9, 300.0, 200.0);

        let hit = schedule(&hero, &[platform], 0.0, &config).unwrap().unwrap();
        assert_eq!(hit.kind, ContactKind::Side);
        // 132 + 3 t = 300 - 1.4 t
        assert!((hit.time - 168.0 / 4.4).abs() < 1e-9);
        let v = hit.trajectory.params().velocity;
        assert!((v.x - (2.0 * -1.4 - 3.0)).abs() < 1e-9);
        let b = hit.trajectory.evaluate(hit.time).unwrap();
        assert!((b.x1 - (300.0 - 1.4 * hit.time)).abs() < 1e-9);
    }

    #[test]
    fn test_newton_schedules_same_landing() {
        let config = Config {
            root_solver: RootSolver::Newton,
            ..Default::default()
        };
        let hero = falling_hero(300.0, 100.0, DVec2::ZERO, 0.2);
        let hit = schedule(&hero, &[cloud(3, 300.0, 200.0)], 0.0, &config)
            .unwrap()
            .unwrap();
        assert_eq!(hit.kind, ContactKind::Landing);
        assert!((hit.time - 680f64.sqrt()).abs() < 1e-3);
    }
}
