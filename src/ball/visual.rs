//! Collision response and cosmetic state stepping
//!
//! The visual layer never feeds back into physics: contacts snap the
//! squish axis to the surface normal, kick the squish spring, and ask the
//! audio collaborator for a pop. The springs themselves advance once per
//! frame here regardless of what triggered them.

use bevy::prelude::*;

use crate::audio::CollisionAudio;
use crate::ball::components::*;
use crate::ball::physics::ContactBegan;
use crate::constants::{
    FRAME_DT_MIN, SQUISH_SCALE_FLOOR, SQUISH_VELOCITY_MAX, SQUISH_VELOCITY_MIN,
};
use crate::events::{BallEvent, EventBus};
use crate::helpers::{move_toward, remap};
use crate::tuning::Tuning;

/// React to this frame's contact-begin reports. Impulses below the minimum
/// produce no reaction at all; above it, strength scales into [0, 0.5].
pub fn ball_contact_response(
    tuning: Res<Tuning>,
    audio: Res<CollisionAudio>,
    mut contacts: MessageReader<ContactBegan>,
    mut bus: ResMut<EventBus>,
    mut deferred: ResMut<DeferredEffects>,
    mut query: Query<&mut BallVisual, With<Ball>>,
) {
    for contact in contacts.read() {
        let strength = remap(
            contact.impulse,
            tuning.min_collision_impulse,
            tuning.max_collision_impulse,
            0.0,
            tuning.max_collision_strength,
        );
        if strength <= 0.0 {
            continue;
        }

        bus.emit(BallEvent::WallContact {
            wall: contact.wall,
            impulse: contact.impulse,
            strength,
        });

        if let Ok(mut visual) = query.single_mut() {
            let normal = Vec2::from(contact.wall.normal());
            visual.squish_axis = normal.y.atan2(normal.x);

            if tuning.squish_on_collision {
                let target = remap(strength, 0.0, 1.0, 1.0, SQUISH_SCALE_FLOOR);
                let entry_velocity =
                    remap(strength, 0.0, 1.0, SQUISH_VELOCITY_MIN, SQUISH_VELOCITY_MAX);
                visual.squish.animate(target as f64, entry_velocity as f64);
                deferred.push(DeferredEffect::SquishRecover);
            }
        }

        if let Some(sound) = audio.request_pop(strength, tuning.sound_pool_size) {
            bus.emit(BallEvent::SoundRequested {
                sound,
                volume: strength,
            });
        }
    }
}

/// Advance the cosmetic springs and the shadow fade once per frame.
pub fn ball_visual_step(
    time: Res<Time>,
    mut query: Query<&mut BallVisual, With<Ball>>,
) {
    // Use minimum dt for headless mode compatibility
    let dt = time.delta_secs().max(FRAME_DT_MIN);

    for mut visual in &mut query {
        visual.squish.step(dt as f64);
        visual.drag_scale.step(dt as f64);
        visual.scripted_scale.step(dt as f64);

        let rate = if visual.shadow_fade_secs > 0.0 {
            dt / visual.shadow_fade_secs
        } else {
            1.0
        };
        visual.shadow_fade = move_toward(visual.shadow_fade, visual.shadow_fade_target, rate);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arena::Arena;
    use crate::audio::{CollisionAudio, NullSink};
    use crate::events::Wall;
    use std::sync::Arc;

    fn response_app() -> App {
        let mut app = App::new();
        app.add_message::<ContactBegan>();
        app.insert_resource(Tuning::default());
        app.insert_resource(Arena::default());
        app.insert_resource(EventBus::new());
        app.insert_resource(DeferredEffects::default());
        app.insert_resource(CollisionAudio::direct(Arc::new(NullSink)));
        app.add_systems(Update, ball_contact_response);
        app.world_mut().spawn((
            Ball::new(100.0),
            BallPhase::Free,
            BallMotion::default(),
            BallVisual::new(1.0),
            Transform::from_xyz(500.0, 400.0, 0.0),
        ));
        app
    }

    fn send_contact(app: &mut App, impulse: f32) {
        app.world_mut()
            .resource_mut::<Messages<ContactBegan>>()
            .write(ContactBegan {
                wall: Wall::Floor,
                impulse,
            });
        app.update();
    }

    #[test]
    fn test_sub_threshold_contact_is_silent() {
        let mut app = response_app();
        send_contact(&mut app, 500.0);

        let bus = app.world_mut().resource_mut::<EventBus>().drain();
        assert!(bus.is_empty(), "got {} events", bus.len());
        assert!(app.world().resource::<DeferredEffects>().is_empty());
    }

    #[test]
    fn test_midrange_contact_reports_quarter_strength() {
        let mut app = response_app();
        send_contact(&mut app, 1500.0);

        let events = app.world_mut().resource_mut::<EventBus>().drain();
        let strengths: Vec<f32> = events
            .iter()
            .filter_map(|e| match e.event {
                BallEvent::WallContact { strength, .. } => Some(strength),
                _ => None,
            })
            .collect();
        assert_eq!(strengths, vec![0.25]);

        let volumes: Vec<f32> = events
            .iter()
            .filter_map(|e| match e.event {
                BallEvent::SoundRequested { volume, .. } => Some(volume),
                _ => None,
            })
            .collect();
        assert_eq!(volumes, vec![0.25]);
    }

    #[test]
    fn test_heavy_contact_clamps_to_half() {
        let mut app = response_app();
        send_contact(&mut app, 2500.0);

        let events = app.world_mut().resource_mut::<EventBus>().drain();
        let strength = events
            .iter()
            .find_map(|e| match e.event {
                BallEvent::WallContact { strength, .. } => Some(strength),
                _ => None,
            })
            .expect("no contact event");
        assert_eq!(strength, 0.5);
    }

    #[test]
    fn test_contact_snaps_squish_axis_and_queues_recovery() {
        let mut app = response_app();
        app.world_mut()
            .resource_mut::<Messages<ContactBegan>>()
            .write(ContactBegan {
                wall: Wall::Left,
                impulse: 1800.0,
            });
        app.update();

        let mut query = app.world_mut().query::<&BallVisual>();
        let visual = query.single(app.world()).unwrap();
        // Left wall normal points along +x.
        assert_eq!(visual.squish_axis, 0.0);
        assert!(visual.squish.is_animating());
        assert!(!app.world().resource::<DeferredEffects>().is_empty());
    }
}
