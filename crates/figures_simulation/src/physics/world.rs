//! PhysicsWorld — обёртка над rapier2d pipeline
//!
//! Мир владеет всеми телами/коллайдерами/джоинтами; снаружи доступны только
//! handles. Шаг собирает begin/end события и импульсы, после шага из narrow
//! phase собираются контактные точки.

use std::num::NonZeroUsize;
use std::sync::Mutex;

use bevy::math::Vec2;
use rapier2d::prelude::*;

use super::contact::{
    ContactBuffer, ContactEvent, ContactImpulse, ContactPoint, PointState, StepEvents,
};
use super::defs::{BodyDef, BodyType, FixtureDef, Shape};
use super::settings::{DrawFlags, Settings};
use crate::render::{Color, DebugDraw, Pose};

/// Гравитация по умолчанию (m/s²)
pub const DEFAULT_GRAVITY: Vec2 = Vec2::new(0.0, -10.0);

/// Мягкий mouse joint: частота и коэффициент демпфирования пружины
pub const MOUSE_JOINT_FREQUENCY_HZ: f32 = 5.0;
pub const MOUSE_JOINT_DAMPING_RATIO: f32 = 0.7;

/// Подшаги CCD при включённом sub-stepping
const CCD_SUBSTEPS: usize = 4;

// Цвета debug draw по состоянию тела
const COLOR_DISABLED: Color = Color::rgb(0.5, 0.5, 0.3);
const COLOR_STATIC: Color = Color::rgb(0.5, 0.9, 0.5);
const COLOR_KINEMATIC: Color = Color::rgb(0.5, 0.5, 0.9);
const COLOR_SLEEPING: Color = Color::rgb(0.6, 0.6, 0.6);
const COLOR_DYNAMIC: Color = Color::rgb(0.9, 0.7, 0.7);
const COLOR_JOINT: Color = Color::rgb(0.5, 0.8, 0.8);
const COLOR_AABB: Color = Color::rgb(0.9, 0.3, 0.9);

pub fn to_vector(v: Vec2) -> Vector<Real> {
    vector![v.x, v.y]
}

pub fn to_point(v: Vec2) -> Point<Real> {
    point![v.x, v.y]
}

pub fn from_vector(v: &Vector<Real>) -> Vec2 {
    Vec2::new(v.x, v.y)
}

pub fn from_point(p: &Point<Real>) -> Vec2 {
    Vec2::new(p.x, p.y)
}

/// Снимок состояния тела (позиции после шага)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodyState {
    pub position: Vec2,
    pub angle: f32,
    pub linear_velocity: Vec2,
    pub awake: bool,
    pub dynamic: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WorldStats {
    pub bodies: usize,
    pub colliders: usize,
    pub joints: usize,
    /// Пары с активным контактом
    pub contacts: usize,
}

/// Как рисовать мир поверх флагов
#[derive(Debug, Clone, Copy, Default)]
pub struct DrawStyle {
    /// Единый цвет для динамических тел
    pub shape_color: Option<Color>,
    /// Джоинт, который рисует сам emitter (mouse joint)
    pub hidden_joint: Option<ImpulseJointHandle>,
}

/// Очередь событий, которую rapier заполняет во время шага
#[derive(Default)]
struct EventQueue {
    contacts: Mutex<Vec<ContactEvent>>,
    impulses: Mutex<Vec<ContactImpulse>>,
}

fn take_queue<T>(queue: &Mutex<Vec<T>>) -> Vec<T> {
    std::mem::take(&mut *queue.lock().unwrap_or_else(|poisoned| poisoned.into_inner()))
}

impl EventQueue {
    fn drain(&self) -> StepEvents {
        StepEvents {
            contacts: take_queue(&self.contacts),
            impulses: take_queue(&self.impulses),
        }
    }
}

impl EventHandler for EventQueue {
    fn handle_collision_event(
        &self,
        _bodies: &RigidBodySet,
        _colliders: &ColliderSet,
        event: CollisionEvent,
        _contact_pair: Option<&ContactPair>,
    ) {
        let contact = match event {
            CollisionEvent::Started(collider1, collider2, _) => ContactEvent::Begin {
                collider1,
                collider2,
            },
            CollisionEvent::Stopped(collider1, collider2, _) => ContactEvent::End {
                collider1,
                collider2,
            },
        };
        if let Ok(mut contacts) = self.contacts.lock() {
            contacts.push(contact);
        }
    }

    fn handle_contact_force_event(
        &self,
        dt: Real,
        _bodies: &RigidBodySet,
        _colliders: &ColliderSet,
        contact_pair: &ContactPair,
        total_force_magnitude: Real,
    ) {
        if let Ok(mut impulses) = self.impulses.lock() {
            impulses.push(ContactImpulse {
                collider1: contact_pair.collider1,
                collider2: contact_pair.collider2,
                normal_impulse: total_force_magnitude * dt,
            });
        }
    }
}

pub struct PhysicsWorld {
    gravity: Vector<Real>,
    params: IntegrationParameters,
    pipeline: PhysicsPipeline,
    islands: IslandManager,
    broad_phase: DefaultBroadPhase,
    narrow_phase: NarrowPhase,
    bodies: RigidBodySet,
    colliders: ColliderSet,
    impulse_joints: ImpulseJointSet,
    multibody_joints: MultibodyJointSet,
    ccd_solver: CCDSolver,
    query_pipeline: QueryPipeline,
    events: EventQueue,
    /// Пары с активным контактом на последнем шаге
    active_pairs: usize,
}

impl Default for PhysicsWorld {
    fn default() -> Self {
        Self::new(DEFAULT_GRAVITY)
    }
}

impl PhysicsWorld {
    pub fn new(gravity: Vec2) -> Self {
        Self {
            gravity: to_vector(gravity),
            params: IntegrationParameters::default(),
            pipeline: PhysicsPipeline::new(),
            islands: IslandManager::new(),
            broad_phase: DefaultBroadPhase::new(),
            narrow_phase: NarrowPhase::new(),
            bodies: RigidBodySet::new(),
            colliders: ColliderSet::new(),
            impulse_joints: ImpulseJointSet::new(),
            multibody_joints: MultibodyJointSet::new(),
            ccd_solver: CCDSolver::new(),
            query_pipeline: QueryPipeline::new(),
            events: EventQueue::default(),
            active_pairs: 0,
        }
    }

    // ========================================================================
    // Bodies / fixtures
    // ========================================================================

    pub fn create_body(&mut self, def: &BodyDef) -> RigidBodyHandle {
        let builder = match def.body_type {
            BodyType::Static => RigidBodyBuilder::fixed(),
            BodyType::Kinematic => RigidBodyBuilder::kinematic_velocity_based(),
            BodyType::Dynamic => RigidBodyBuilder::dynamic(),
        };

        let body = builder
            .translation(to_vector(def.position))
            .rotation(def.angle)
            .linvel(to_vector(def.linear_velocity))
            .angvel(def.angular_velocity)
            .linear_damping(def.linear_damping)
            .angular_damping(def.angular_damping)
            .gravity_scale(def.gravity_scale)
            .ccd_enabled(def.bullet)
            .can_sleep(def.allow_sleep)
            .sleeping(!def.awake)
            .build();

        self.bodies.insert(body)
    }

    /// Удаляет тело вместе с коллайдерами и джоинтами.
    ///
    /// Возвращает джоинты, которые были уничтожены вместе с телом.
    pub fn remove_body(&mut self, handle: RigidBodyHandle) -> Vec<ImpulseJointHandle> {
        if !self.contains_body(handle) {
            return Vec::new();
        }

        let destroyed: Vec<ImpulseJointHandle> = self
            .impulse_joints
            .attached_joints(handle)
            .map(|(_, _, joint, _)| joint)
            .collect();

        self.bodies.remove(
            handle,
            &mut self.islands,
            &mut self.colliders,
            &mut self.impulse_joints,
            &mut self.multibody_joints,
            true,
        );

        destroyed
    }

    /// `None` если фигура вырожденная или тела нет
    pub fn create_fixture(
        &mut self,
        body: RigidBodyHandle,
        fixture: &FixtureDef,
    ) -> Option<ColliderHandle> {
        if !self.bodies.contains(body) {
            return None;
        }

        let collider = collider_builder(&fixture.shape)?
            .density(fixture.density)
            .friction(fixture.friction)
            .restitution(fixture.restitution)
            .restitution_combine_rule(CoefficientCombineRule::Max)
            .sensor(fixture.is_sensor)
            .active_events(ActiveEvents::COLLISION_EVENTS | ActiveEvents::CONTACT_FORCE_EVENTS)
            .contact_force_event_threshold(0.0)
            .build();

        Some(
            self.colliders
                .insert_with_parent(collider, body, &mut self.bodies),
        )
    }

    pub fn contains_body(&self, handle: RigidBodyHandle) -> bool {
        self.bodies.contains(handle)
    }

    pub fn body_state(&self, handle: RigidBodyHandle) -> Option<BodyState> {
        self.bodies.get(handle).map(body_state)
    }

    /// Состояния всех тел в порядке хранения (детерминированный порядок)
    pub fn body_states(&self) -> Vec<BodyState> {
        self.bodies.iter().map(|(_, body)| body_state(body)).collect()
    }

    pub fn body_mass(&self, handle: RigidBodyHandle) -> Option<f32> {
        self.bodies.get(handle).map(|body| body.mass())
    }

    pub fn body_of(&self, collider: ColliderHandle) -> Option<RigidBodyHandle> {
        self.colliders.get(collider).and_then(Collider::parent)
    }

    pub fn stats(&self) -> WorldStats {
        WorldStats {
            bodies: self.bodies.len(),
            colliders: self.colliders.len(),
            joints: self.impulse_joints.len(),
            contacts: self.active_pairs,
        }
    }

    // ========================================================================
    // Mouse joint
    // ========================================================================

    /// Мягкая пружина между `anchor_body` (ground) и `body`, цель — `target`
    pub fn create_mouse_joint(
        &mut self,
        anchor_body: RigidBodyHandle,
        body: RigidBodyHandle,
        target: Vec2,
    ) -> Option<ImpulseJointHandle> {
        let anchor_local = self
            .bodies
            .get(anchor_body)?
            .position()
            .inverse_transform_point(&to_point(target));

        let dragged = self.bodies.get_mut(body)?;
        let body_local = dragged.position().inverse_transform_point(&to_point(target));
        dragged.wake_up(true);

        let omega = std::f32::consts::TAU * MOUSE_JOINT_FREQUENCY_HZ;
        let joint = SpringJointBuilder::new(0.0, omega * omega, 2.0 * MOUSE_JOINT_DAMPING_RATIO * omega)
            .spring_model(MotorModel::AccelerationBased)
            .local_anchor1(anchor_local)
            .local_anchor2(body_local);

        Some(self.impulse_joints.insert(anchor_body, body, joint, true))
    }

    pub fn set_mouse_target(&mut self, joint: ImpulseJointHandle, target: Vec2) {
        let Some(handle) = self.impulse_joints.get(joint).map(|j| j.body1) else {
            return;
        };
        let Some(anchor_local) = self
            .bodies
            .get(handle)
            .map(|anchor| anchor.position().inverse_transform_point(&to_point(target)))
        else {
            return;
        };

        if let Some(mouse) = self.impulse_joints.get_mut(joint) {
            mouse.data.set_local_anchor1(anchor_local);
            let dragged = mouse.body2;
            if let Some(body) = self.bodies.get_mut(dragged) {
                body.wake_up(true);
            }
        }
    }

    /// (якорь на ground, якорь на теле) в мировых координатах
    pub fn joint_anchors(&self, joint: ImpulseJointHandle) -> Option<(Vec2, Vec2)> {
        let joint = self.impulse_joints.get(joint)?;
        let body1 = self.bodies.get(joint.body1)?;
        let body2 = self.bodies.get(joint.body2)?;
        Some((
            from_point(&(body1.position() * joint.data.local_anchor1())),
            from_point(&(body2.position() * joint.data.local_anchor2())),
        ))
    }

    pub fn remove_joint(&mut self, joint: ImpulseJointHandle) -> bool {
        self.impulse_joints.remove(joint, true).is_some()
    }

    pub fn contains_joint(&self, joint: ImpulseJointHandle) -> bool {
        self.impulse_joints.get(joint).is_some()
    }

    // ========================================================================
    // Queries
    // ========================================================================

    /// Динамическое тело, содержащее точку
    pub fn query_dynamic_body_at(&mut self, p: Vec2) -> Option<RigidBodyHandle> {
        self.query_pipeline.update(&self.colliders);

        let mut hit = None;
        self.query_pipeline.intersections_with_point(
            &self.bodies,
            &self.colliders,
            &to_point(p),
            QueryFilter::only_dynamic(),
            |collider| {
                hit = Some(collider);
                false
            },
        );

        hit.and_then(|collider| self.body_of(collider))
    }

    // ========================================================================
    // Step
    // ========================================================================

    /// Один шаг мира. `dt <= 0` — только пересбор контактов без интеграции.
    pub fn step(&mut self, dt: f32, settings: &Settings) -> StepEvents {
        self.apply_settings(settings);

        if dt <= 0.0 {
            return StepEvents::default();
        }
        self.params.dt = dt;

        self.pipeline.step(
            &self.gravity,
            &self.params,
            &mut self.islands,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.bodies,
            &mut self.colliders,
            &mut self.impulse_joints,
            &mut self.multibody_joints,
            &mut self.ccd_solver,
            Some(&mut self.query_pipeline),
            &(),
            &self.events,
        );

        self.events.drain()
    }

    fn apply_settings(&mut self, settings: &Settings) {
        self.params.num_solver_iterations =
            NonZeroUsize::new(settings.velocity_iterations as usize).unwrap_or(NonZeroUsize::MIN);
        self.params.num_internal_stabilization_iterations = settings.position_iterations as usize;
        self.params.warmstart_coefficient = if settings.enable_warm_starting { 1.0 } else { 0.0 };
        self.params.max_ccd_substeps = if settings.enable_sub_stepping { CCD_SUBSTEPS } else { 1 };

        // Continuous: CCD у всех динамических тел
        for (_, body) in self.bodies.iter_mut() {
            let ccd = body.is_dynamic() && settings.enable_continuous;
            if body.is_ccd_enabled() != ccd {
                body.enable_ccd(ccd);
            }
            if !settings.enable_sleep && body.is_dynamic() && body.is_sleeping() {
                body.wake_up(false);
            }
        }
    }

    /// Перезаполняет буфер точками активных контактов.
    ///
    /// Точка `Add`, если у неё не было импульса на прошлом шаге (новая точка
    /// manifold'а), иначе `Persist`. Импульсы берутся из ближайшей
    /// tracked-точки manifold'а.
    pub fn collect_contact_points(&mut self, buffer: &mut ContactBuffer) {
        buffer.clear();
        let mut active_pairs = 0;

        for pair in self.narrow_phase.contact_pairs() {
            if !pair.has_any_active_contact {
                continue;
            }
            active_pairs += 1;

            let (Some(co1), Some(co2)) = (
                self.colliders.get(pair.collider1),
                self.colliders.get(pair.collider2),
            ) else {
                continue;
            };

            for manifold in &pair.manifolds {
                let pos1 = manifold
                    .subshape_pos1
                    .map_or(*co1.position(), |sub| co1.position() * sub);
                let pos2 = manifold
                    .subshape_pos2
                    .map_or(*co2.position(), |sub| co2.position() * sub);
                let normal = from_vector(&manifold.data.normal);

                for contact in &manifold.data.solver_contacts {
                    let position = from_point(&contact.point);
                    let tracked = manifold.points.iter().min_by(|a, b| {
                        let da = tracked_center(&pos1, &pos2, a).distance_squared(position);
                        let db = tracked_center(&pos1, &pos2, b).distance_squared(position);
                        da.total_cmp(&db)
                    });

                    buffer.push(ContactPoint {
                        collider1: pair.collider1,
                        collider2: pair.collider2,
                        normal,
                        position,
                        state: if contact.is_new {
                            PointState::Add
                        } else {
                            PointState::Persist
                        },
                        normal_impulse: tracked.map_or(0.0, |point| point.data.impulse),
                        tangent_impulse: tracked
                            .map_or(0.0, |point| point.data.tangent_impulse.norm()),
                        separation: contact.dist,
                    });
                }
            }
        }

        self.active_pairs = active_pairs;
    }

    /// Сдвигает начало координат: все тела смещаются на `-origin`
    pub fn shift_origin(&mut self, origin: Vec2) {
        let offset = to_vector(origin);
        for (_, body) in self.bodies.iter_mut() {
            let translation = body.translation() - offset;
            body.set_translation(translation, true);
        }

        // Позы коллайдеров вслед за телами (для query до следующего step)
        for (_, collider) in self.colliders.iter_mut() {
            let position = match (collider.parent(), collider.position_wrt_parent()) {
                (Some(parent), Some(local)) => match self.bodies.get(parent) {
                    Some(body) => body.position() * local,
                    None => continue,
                },
                _ => Isometry::new(collider.translation() - offset, collider.rotation().angle()),
            };
            collider.set_position(position);
        }
        self.query_pipeline.update(&self.colliders);
    }

    // ========================================================================
    // Debug draw
    // ========================================================================

    pub fn draw_debug(&self, draw: &mut dyn DebugDraw, flags: DrawFlags, style: DrawStyle) {
        if flags.shapes {
            for (_, collider) in self.colliders.iter() {
                let color = collider
                    .parent()
                    .and_then(|parent| self.bodies.get(parent))
                    .map_or(COLOR_STATIC, |body| body_color(body, style.shape_color));
                draw_collider(draw, collider, color);
            }
        }

        if flags.joints {
            for (handle, joint) in self.impulse_joints.iter() {
                if Some(handle) == style.hidden_joint {
                    continue;
                }
                let (Some(body1), Some(body2)) =
                    (self.bodies.get(joint.body1), self.bodies.get(joint.body2))
                else {
                    continue;
                };
                let x1 = from_vector(body1.translation());
                let x2 = from_vector(body2.translation());
                let p1 = from_point(&(body1.position() * joint.data.local_anchor1()));
                let p2 = from_point(&(body2.position() * joint.data.local_anchor2()));
                draw.draw_segment(x1, p1, COLOR_JOINT);
                draw.draw_segment(p1, p2, COLOR_JOINT);
                draw.draw_segment(x2, p2, COLOR_JOINT);
            }
        }

        if flags.aabbs {
            for (_, collider) in self.colliders.iter() {
                let aabb = collider.compute_aabb();
                let (lo, hi) = (from_point(&aabb.mins), from_point(&aabb.maxs));
                draw.draw_polygon(
                    &[lo, Vec2::new(hi.x, lo.y), hi, Vec2::new(lo.x, hi.y)],
                    COLOR_AABB,
                );
            }
        }

        if flags.centers_of_mass {
            for (_, body) in self.bodies.iter() {
                draw.draw_transform(Pose::new(
                    from_point(body.center_of_mass()),
                    body.rotation().angle(),
                ));
            }
        }
    }
}

fn body_state(body: &RigidBody) -> BodyState {
    BodyState {
        position: from_vector(body.translation()),
        angle: body.rotation().angle(),
        linear_velocity: from_vector(body.linvel()),
        awake: !body.is_sleeping(),
        dynamic: body.is_dynamic(),
    }
}

fn body_color(body: &RigidBody, shape_color: Option<Color>) -> Color {
    if !body.is_enabled() {
        COLOR_DISABLED
    } else if body.is_fixed() {
        COLOR_STATIC
    } else if body.is_kinematic() {
        COLOR_KINEMATIC
    } else if body.is_sleeping() {
        shape_color.map_or(COLOR_SLEEPING, |color| color.with_alpha(0.6))
    } else {
        shape_color.unwrap_or(COLOR_DYNAMIC)
    }
}

/// Середина между точками контакта на обоих коллайдерах (world space)
fn tracked_center(
    pos1: &Isometry<Real>,
    pos2: &Isometry<Real>,
    point: &rapier2d::geometry::Contact,
) -> Vec2 {
    let p1 = from_point(&(pos1 * point.local_p1));
    let p2 = from_point(&(pos2 * point.local_p2));
    (p1 + p2) * 0.5
}

fn collider_builder(shape: &Shape) -> Option<ColliderBuilder> {
    if shape.is_degenerate() {
        return None;
    }

    match shape {
        Shape::Circle { radius, center } => {
            Some(ColliderBuilder::ball(*radius).translation(to_vector(*center)))
        }
        Shape::Polygon { vertices } => {
            let points: Vec<Point<Real>> = vertices.iter().copied().map(to_point).collect();
            ColliderBuilder::convex_hull(&points)
        }
        Shape::Box {
            half_extents,
            center,
            angle,
        } => Some(
            ColliderBuilder::cuboid(half_extents.x, half_extents.y)
                .position(Isometry::new(to_vector(*center), *angle)),
        ),
        Shape::Edge { v1, v2 } => Some(ColliderBuilder::segment(to_point(*v1), to_point(*v2))),
    }
}

fn draw_collider(draw: &mut dyn DebugDraw, collider: &Collider, color: Color) {
    let position = collider.position();
    let shape = collider.shape();
    let world = |p: &Point<Real>| from_point(&(position * p));

    if let Some(ball) = shape.as_ball() {
        let center = from_vector(&position.translation.vector);
        let axis = from_vector(&(position.rotation * Vector::x()));
        draw.draw_solid_circle(center, ball.radius, axis, color);
    } else if let Some(cuboid) = shape.as_cuboid() {
        let he = cuboid.half_extents;
        let corners = [
            point![-he.x, -he.y],
            point![he.x, -he.y],
            point![he.x, he.y],
            point![-he.x, he.y],
        ];
        let vertices: Vec<Vec2> = corners.iter().map(world).collect();
        draw.draw_solid_polygon(&vertices, color);
    } else if let Some(polygon) = shape.as_convex_polygon() {
        let vertices: Vec<Vec2> = polygon.points().iter().map(world).collect();
        draw.draw_solid_polygon(&vertices, color);
    } else if let Some(triangle) = shape.as_triangle() {
        let vertices = [world(&triangle.a), world(&triangle.b), world(&triangle.c)];
        draw.draw_solid_polygon(&vertices, color);
    } else if let Some(segment) = shape.as_segment() {
        draw.draw_segment(world(&segment.a), world(&segment.b), color);
    }
}
