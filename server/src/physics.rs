//! Fixed-step ball simulation
//!
//! Velocities are in field units per tick, so one call to [`step`] is one tick
//! regardless of wall-clock jitter.

use shared::{
    Ball, Paddle, Role, BALL_ACCELERATION, BALL_RADIUS, FIELD_HEIGHT, FIELD_WIDTH, LEFT_PADDLE_X,
    PADDLE_HEIGHT, PADDLE_WIDTH, RIGHT_PADDLE_X,
};

///Advances the ball by one tick.
///Returns the side that scored if the ball left the field.
pub fn step(ball: &mut Ball, paddle1: &Paddle, paddle2: &Paddle) -> Option<Role> {
    integrate(ball);
    resolve_walls(ball);
    resolve_paddle(ball, paddle1, Role::One);
    resolve_paddle(ball, paddle2, Role::Two);
    check_exit(ball)
}

pub fn integrate(ball: &mut Ball) {
    ball.x += ball.velocity_x;
    ball.y += ball.velocity_y;
}

///Reflects off the top and bottom walls, leaving the ball's edge on the wall.
pub fn resolve_walls(ball: &mut Ball) {
    let hits_top = ball.y - BALL_RADIUS <= 0.0;
    let hits_bottom = ball.y + BALL_RADIUS >= FIELD_HEIGHT;

    if hits_top || hits_bottom {
        ball.velocity_y = -ball.velocity_y;
        if hits_top {
            ball.y = BALL_RADIUS;
        } else {
            ball.y = FIELD_HEIGHT - BALL_RADIUS;
        }
    }
}

///Left edge of the paddle owned by `role`.
pub fn paddle_x(role: Role) -> f32 {
    match role {
        Role::One => LEFT_PADDLE_X,
        Role::Two => RIGHT_PADDLE_X,
    }
}

///Checks whether the ball's bounding box touches a paddle's rectangle.
pub fn overlaps_paddle(ball: &Ball, paddle: &Paddle, role: Role) -> bool {
    let left = paddle_x(role);
    let right = left + PADDLE_WIDTH;

    ball.x - BALL_RADIUS <= right
        && ball.x + BALL_RADIUS >= left
        && ball.y + BALL_RADIUS >= paddle.y
        && ball.y - BALL_RADIUS <= paddle.y + PADDLE_HEIGHT
}

///Bounces the ball off a paddle it is moving toward.
///Returns true if a bounce happened.
///
///A ball already travelling away from the paddle is left alone, so a ball that
///is still overlapping after a bounce cannot bounce twice.
pub fn resolve_paddle(ball: &mut Ball, paddle: &Paddle, role: Role) -> bool {
    let approaching = match role {
        Role::One => ball.velocity_x < 0.0,
        Role::Two => ball.velocity_x > 0.0,
    };

    if !approaching || !overlaps_paddle(ball, paddle, role) {
        return false;
    }

    ball.velocity_x = -ball.velocity_x * BALL_ACCELERATION;
    ball.velocity_y *= BALL_ACCELERATION;

    // Sit flush against the paddle face
    ball.x = match role {
        Role::One => LEFT_PADDLE_X + PADDLE_WIDTH + BALL_RADIUS,
        Role::Two => RIGHT_PADDLE_X - BALL_RADIUS,
    };
    true
}

///Returns the side credited if the ball has fully left the field horizontally.
///The point goes to the opponent of whoever defends the goal line it crossed.
pub fn check_exit(ball: &Ball) -> Option<Role> {
    let conceded = if ball.x < -BALL_RADIUS {
        Role::One
    } else if ball.x > FIELD_WIDTH + BALL_RADIUS {
        Role::Two
    } else {
        return None;
    };
    Some(conceded.opponent())
}
